#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic meteor shower system that emits meteor spawn commands while
//! the designated scene is active.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robot_run_core::{Command, Event, SceneIndex};
use tracing::debug;

/// Mixed into the seed so the shower's stream differs from the world's.
const SHOWER_STREAM: u64 = 0xd1b5_4a32_d192_ed03;
/// Horizontal distance kept between a spawned meteor and either screen edge.
const EDGE_CLEARANCE: f32 = 32.0;

/// Configuration parameters required to construct the meteor shower.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    scene: SceneIndex,
    min_interval: Duration,
    max_interval: Duration,
    min_rotation_speed: f32,
    max_rotation_speed: f32,
    screen_width: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration for a shower over `scene`.
    ///
    /// The delay between two meteors is drawn from `min_interval..=max_interval`;
    /// the bounds are swapped when given in the wrong order.
    #[must_use]
    pub fn new(
        scene: SceneIndex,
        min_interval: Duration,
        max_interval: Duration,
        screen_width: f32,
        rng_seed: u64,
    ) -> Self {
        let (min_interval, max_interval) = if min_interval <= max_interval {
            (min_interval, max_interval)
        } else {
            (max_interval, min_interval)
        };
        Self {
            scene,
            min_interval,
            max_interval,
            min_rotation_speed: 45.0,
            max_rotation_speed: 180.0,
            screen_width,
            rng_seed,
        }
    }

    /// Overrides the spin rate range in degrees per second.
    ///
    /// Both bounds are taken as magnitudes; the direction is chosen per meteor.
    #[must_use]
    pub fn with_rotation_speeds(mut self, min: f32, max: f32) -> Self {
        let (min, max) = (min.abs(), max.abs());
        self.min_rotation_speed = min.min(max);
        self.max_rotation_speed = min.max(max);
        self
    }

    /// Scene in which meteors fall.
    #[must_use]
    pub const fn scene(&self) -> SceneIndex {
        self.scene
    }
}

/// Pure system that turns elapsed time into falling meteors.
#[derive(Debug)]
pub struct MeteorShower {
    config: Config,
    accumulator: Duration,
    next_interval: Duration,
    rng: ChaCha8Rng,
}

impl MeteorShower {
    /// Creates a new meteor shower using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed ^ SHOWER_STREAM);
        let next_interval = roll_interval(&config, &mut rng);
        Self {
            config,
            accumulator: Duration::ZERO,
            next_interval,
            rng,
        }
    }

    /// Time that must still pass before the next meteor spawns.
    #[must_use]
    pub fn time_until_next(&self) -> Duration {
        self.next_interval.saturating_sub(self.accumulator)
    }

    /// Consumes events and the active scene to emit spawn commands.
    ///
    /// At most one meteor is emitted per call; time left over after a spawn is
    /// discarded.
    pub fn handle(
        &mut self,
        events: &[Event],
        current_scene: Option<SceneIndex>,
        out: &mut Vec<Command>,
    ) {
        if current_scene != Some(self.config.scene) {
            self.accumulator = Duration::ZERO;
            return;
        }

        let accumulated = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator < self.next_interval {
            return;
        }

        self.accumulator = Duration::ZERO;
        self.next_interval = roll_interval(&self.config, &mut self.rng);

        let center_x = self.roll_center_x();
        let rotation_speed = self.roll_rotation_speed();
        debug!(
            center_x,
            rotation_speed,
            next_in = ?self.next_interval,
            "meteor requested"
        );
        out.push(Command::SpawnMeteor {
            center_x,
            rotation_speed,
        });
    }

    fn roll_center_x(&mut self) -> f32 {
        let max = self.config.screen_width - EDGE_CLEARANCE;
        if max <= EDGE_CLEARANCE {
            return self.config.screen_width * 0.5;
        }
        self.rng.gen_range(EDGE_CLEARANCE..=max)
    }

    fn roll_rotation_speed(&mut self) -> f32 {
        let speed = self
            .rng
            .gen_range(self.config.min_rotation_speed..=self.config.max_rotation_speed);
        if self.rng.gen_bool(0.5) {
            speed
        } else {
            -speed
        }
    }
}

fn roll_interval<R: Rng>(config: &Config, rng: &mut R) -> Duration {
    rng.gen_range(config.min_interval..=config.max_interval)
}
