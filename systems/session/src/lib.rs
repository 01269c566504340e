#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver that wires player input, the world and the meteor shower
//! together for a single Robot Run session.
//!
//! The session owns the pausable stopwatch. While paused, input toggles are
//! still honoured but the world is not ticked.

mod stopwatch;

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robot_run_core::{
    Action, ClipLibrary, Command, CrawlerKind, Event, Facing, InputSnapshot, LevelLayout,
    MusicCue, SceneIndex, Track, Tuning,
};
use robot_run_system_meteor_shower::{Config as MeteorShowerConfig, MeteorShower};
use robot_run_world::{self as world, query, World};
use tracing::{debug, info};

pub use stopwatch::Stopwatch;

/// Mixed into the seed so debug spawns do not disturb the world's stream.
const SESSION_STREAM: u64 = 0x94d0_49bb_1331_11eb;
/// Horizontal distance kept between a debug crawler and either screen edge.
const DEBUG_SPAWN_CLEARANCE: f32 = 32.0;

/// Configuration parameters required to construct a session.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: Tuning,
    clips: ClipLibrary,
    meteor_shower: MeteorShowerConfig,
}

impl Config {
    /// Creates a configuration from gameplay tuning, animation clips and the
    /// meteor shower settings.
    #[must_use]
    pub fn new(tuning: Tuning, clips: ClipLibrary, meteor_shower: MeteorShowerConfig) -> Self {
        Self {
            tuning,
            clips,
            meteor_shower,
        }
    }
}

/// Playback state of the background music, as implied by emitted cues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MusicState {
    /// Nothing is playing.
    #[default]
    Stopped,
    /// The track is playing.
    Playing(Track),
    /// The track is paused.
    Paused(Track),
}

impl MusicState {
    /// Cue that the music toggle should emit from this state.
    #[must_use]
    pub const fn toggle_cue(self) -> MusicCue {
        match self {
            Self::Stopped => MusicCue::Play(Track::Main),
            Self::Playing(_) => MusicCue::Pause,
            Self::Paused(_) => MusicCue::Resume,
        }
    }

    /// State reached after `cue` has been played.
    #[must_use]
    pub const fn after(self, cue: MusicCue) -> Self {
        match (self, cue) {
            (_, MusicCue::Play(track)) => Self::Playing(track),
            (Self::Playing(track), MusicCue::Pause) => Self::Paused(track),
            (Self::Paused(track), MusicCue::Resume) => Self::Playing(track),
            (_, MusicCue::Halt) => Self::Stopped,
            (state, MusicCue::Pause | MusicCue::Resume) => state,
        }
    }
}

/// Tracks which actions were held on the previous frame.
#[derive(Clone, Copy, Debug, Default)]
struct Latches {
    previous: InputSnapshot,
}

impl Latches {
    /// Returns the actions that went down this frame.
    fn pressed(&mut self, input: InputSnapshot) -> InputSnapshot {
        let pressed = input
            .held()
            .filter(|action| !self.previous.is_down(*action))
            .collect();
        self.previous = input;
        pressed
    }
}

/// Drives one play session: input toggles, the world tick and the meteor
/// shower.
#[derive(Debug)]
pub struct Session {
    world: World,
    meteor_shower: MeteorShower,
    stopwatch: Stopwatch,
    latches: Latches,
    music: MusicState,
    debug_rects: bool,
    rng: ChaCha8Rng,
}

impl Session {
    /// Creates a session with an empty world.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.tuning.seed ^ SESSION_STREAM);
        Self {
            world: World::new(config.tuning, config.clips),
            meteor_shower: MeteorShower::new(config.meteor_shower),
            stopwatch: Stopwatch::new(),
            latches: Latches::default(),
            music: MusicState::Stopped,
            debug_rects: false,
            rng,
        }
    }

    /// Configures `scenes`, loads the first one and starts the main track.
    pub fn start(&mut self, scenes: Vec<LevelLayout>, out: &mut Vec<Event>) {
        let start = out.len();
        world::apply(
            &mut self.world,
            Command::ConfigureScenes { scenes },
            out,
        );
        world::apply(
            &mut self.world,
            Command::LoadScene {
                scene: SceneIndex::new(0),
                spawn_items: true,
            },
            out,
        );
        out.push(Event::MusicChanged {
            cue: MusicCue::Play(Track::Main),
        });
        self.observe(&out[start..]);
    }

    /// Runs one host frame.
    ///
    /// `host_dt` is the wall-clock time since the previous frame. Toggles are
    /// edge-triggered; holding a key only counts on the frame it goes down.
    pub fn frame(&mut self, host_dt: Duration, input: InputSnapshot, out: &mut Vec<Event>) {
        let start = out.len();
        let pressed = self.latches.pressed(input);

        if pressed.is_down(Action::Pause) {
            let paused = self.stopwatch.toggle();
            info!(paused, "stopwatch toggled");
        }
        if pressed.is_down(Action::ToggleDebugRects) {
            self.debug_rects = !self.debug_rects;
            debug!(visible = self.debug_rects, "debug rects toggled");
        }
        if pressed.is_down(Action::ToggleMusic) {
            out.push(Event::MusicChanged {
                cue: self.music.toggle_cue(),
            });
        }
        if pressed.is_down(Action::SpawnWeakCrawler) {
            self.spawn_debug_crawler(CrawlerKind::Weak, out);
        }
        if pressed.is_down(Action::SpawnStrongCrawler) {
            self.spawn_debug_crawler(CrawlerKind::Strong, out);
        }

        let dt = self.stopwatch.advance(host_dt);
        if !self.stopwatch.is_paused() {
            let tick_start = out.len();
            world::apply(&mut self.world, Command::Tick { dt, input }, out);

            let mut commands = Vec::new();
            self.meteor_shower
                .handle(&out[tick_start..], query::scene(&self.world), &mut commands);
            for command in commands {
                world::apply(&mut self.world, command, out);
            }
        }

        self.observe(&out[start..]);
    }

    /// World driven by this session.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Stopwatch gating the world tick.
    #[must_use]
    pub const fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Whether the world tick is currently suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.stopwatch.is_paused()
    }

    /// Whether collision rectangles should be drawn.
    #[must_use]
    pub const fn debug_rects_visible(&self) -> bool {
        self.debug_rects
    }

    /// Music playback state implied by the cues emitted so far.
    #[must_use]
    pub const fn music(&self) -> MusicState {
        self.music
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Event::MusicChanged { cue } = event {
                self.music = self.music.after(*cue);
            }
        }
    }

    fn spawn_debug_crawler(&mut self, kind: CrawlerKind, out: &mut Vec<Event>) {
        let tuning = query::tuning(&self.world);
        let max = tuning.screen_width - DEBUG_SPAWN_CLEARANCE;
        let x = if max > DEBUG_SPAWN_CLEARANCE {
            self.rng.gen_range(DEBUG_SPAWN_CLEARANCE..=max)
        } else {
            tuning.screen_width * 0.5
        };
        let bottom = tuning.screen_height - tuning.tile_height;
        let facing = if self.rng.gen_bool(0.5) {
            Facing::Left
        } else {
            Facing::Right
        };
        world::apply(
            &mut self.world,
            Command::SpawnCrawler {
                kind,
                x,
                bottom,
                facing,
            },
            out,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn music_toggle_cycles_play_pause_resume() {
        let mut state = MusicState::Stopped;
        let mut cues = Vec::new();
        for _ in 0..4 {
            let cue = state.toggle_cue();
            cues.push(cue);
            state = state.after(cue);
        }

        assert_eq!(
            cues,
            vec![
                MusicCue::Play(Track::Main),
                MusicCue::Pause,
                MusicCue::Resume,
                MusicCue::Pause,
            ]
        );
        assert_eq!(state, MusicState::Paused(Track::Main));
    }

    #[test]
    fn halt_and_track_switches_are_tracked() {
        let state = MusicState::Paused(Track::Main).after(MusicCue::Halt);
        assert_eq!(state, MusicState::Stopped);
        assert_eq!(state.after(MusicCue::Resume), MusicState::Stopped);
        assert_eq!(
            state.after(MusicCue::Play(Track::GameOver)),
            MusicState::Playing(Track::GameOver)
        );
    }

    #[test]
    fn latches_report_each_press_once() {
        let mut latches = Latches::default();
        let held = InputSnapshot::new().with(Action::Pause);

        assert!(latches.pressed(held).is_down(Action::Pause));
        assert!(!latches.pressed(held).is_down(Action::Pause));
        assert!(!latches.pressed(InputSnapshot::new()).is_down(Action::Pause));
        assert!(latches.pressed(held).is_down(Action::Pause));
    }
}
