//! Patrolling crawler enemies.

use rand::Rng;
use robot_run_core::{
    ClipKey, ClipLibrary, CrawlerBehavior, CrawlerId, CrawlerKind, CrawlerState, Facing, Rect,
    StompRule, Tuning,
};
use tracing::debug;

use crate::{animation::Animation, grid::TileGrid};

const IDLE_CYCLES: std::ops::RangeInclusive<u32> = 2..=5;
const WALK_CYCLES: std::ops::RangeInclusive<u32> = 5..=10;
const SPEED_SCALE: std::ops::RangeInclusive<f32> = 0.5..=2.0;
const PROBE_EPSILON: f32 = 0.01;

/// Per-crawler randomness and clock needed to re-roll think timers.
pub(crate) struct Thinking<'a, R> {
    pub(crate) clips: &'a ClipLibrary,
    pub(crate) now: f32,
    pub(crate) rng: &'a mut R,
}

/// A patrolling enemy parameterised by a [`CrawlerBehavior`].
#[derive(Clone, Debug)]
pub struct Crawler {
    id: CrawlerId,
    kind: CrawlerKind,
    behavior: CrawlerBehavior,
    x: f32,
    bottom: f32,
    facing: Facing,
    speed_scale: f32,
    state: CrawlerState,
    next_think: f32,
    time_to_death: f32,
    jumped_on: bool,
    idle_clip: ClipKey,
    walk_clip: ClipKey,
    animation: Animation,
    collision: Rect,
    sensed_tile: Option<Rect>,
    grayscale: bool,
}

impl Crawler {
    /// Creates a crawler and immediately picks its first idle or walk phase.
    pub(crate) fn spawn<R: Rng>(
        id: CrawlerId,
        kind: CrawlerKind,
        x: f32,
        bottom: f32,
        facing: Facing,
        thinking: Thinking<'_, R>,
    ) -> Self {
        let (idle_clip, walk_clip) = clips_for(kind);
        let mut crawler = Self {
            id,
            kind,
            behavior: kind.behavior(),
            x,
            bottom,
            facing,
            speed_scale: 1.0,
            state: CrawlerState::Init,
            next_think: thinking.now,
            time_to_death: 0.0,
            jumped_on: kind.behavior().stomp == StompRule::Kill,
            idle_clip,
            walk_clip,
            animation: Animation::new(idle_clip, thinking.clips),
            collision: Rect::default(),
            sensed_tile: None,
            grayscale: false,
        };
        let first = if thinking.rng.gen_bool(0.5) {
            CrawlerState::Idle
        } else {
            CrawlerState::Walk
        };
        crawler.enter(first, thinking);
        crawler.collision = crawler.compute_collision();
        crawler
    }

    /// Identifier of the crawler.
    #[must_use]
    pub const fn id(&self) -> CrawlerId {
        self.id
    }

    /// Variant the crawler was spawned as.
    #[must_use]
    pub const fn kind(&self) -> CrawlerKind {
        self.kind
    }

    /// Behaviour currently in effect; strong crawlers switch to the weak
    /// behaviour after their first stomp.
    #[must_use]
    pub const fn behavior(&self) -> CrawlerBehavior {
        self.behavior
    }

    /// Current AI state.
    #[must_use]
    pub const fn state(&self) -> CrawlerState {
        self.state
    }

    /// Walking direction.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Multiplier applied to the base speed during the current walk.
    #[must_use]
    pub const fn speed_scale(&self) -> f32 {
        self.speed_scale
    }

    /// World time at which the current idle or walk phase ends.
    #[must_use]
    pub const fn next_think(&self) -> f32 {
        self.next_think
    }

    /// Seconds of death animation left while dying.
    #[must_use]
    pub const fn time_to_death(&self) -> f32 {
        self.time_to_death
    }

    /// Whether the next stomp starts the crawler's death.
    #[must_use]
    pub const fn jumped_on(&self) -> bool {
        self.jumped_on
    }

    /// Animation being played.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Visual rectangle derived from the current frame size.
    #[must_use]
    pub fn screen_rect(&self) -> Rect {
        let width = self.animation.frame_width();
        let height = self.animation.frame_height();
        Rect::new(self.x, self.bottom - height, width, height)
    }

    /// Inset rectangle used for gameplay overlap tests.
    #[must_use]
    pub const fn collision_rect(&self) -> Rect {
        self.collision
    }

    /// Cell most recently probed for ground ahead, if the crawler senses ledges.
    #[must_use]
    pub const fn sensed_tile(&self) -> Option<Rect> {
        self.sensed_tile
    }

    /// Whether the crawler should be drawn without colour.
    #[must_use]
    pub const fn grayscale(&self) -> bool {
        self.grayscale
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    /// Requests a transition to `requested`.
    ///
    /// Requesting the current state does nothing, as does asking a dying or
    /// dead crawler to idle or walk.
    pub(crate) fn set_state<R: Rng>(&mut self, requested: CrawlerState, thinking: Thinking<'_, R>) {
        if requested == self.state {
            return;
        }
        match (self.state, requested) {
            (_, CrawlerState::Init) => {
                debug_assert!(false, "crawlers never return to Init");
            }
            (CrawlerState::Dying | CrawlerState::Dead, CrawlerState::Idle | CrawlerState::Walk)
            | (CrawlerState::Dead, CrawlerState::Dying) => {}
            _ => self.enter(requested, thinking),
        }
    }

    fn enter<R: Rng>(&mut self, state: CrawlerState, thinking: Thinking<'_, R>) {
        let Thinking { clips, now, rng } = thinking;
        match state {
            CrawlerState::Init => {}
            CrawlerState::Idle => {
                self.animation.restart(self.idle_clip, clips);
                let cycles = rng.gen_range(IDLE_CYCLES);
                self.next_think = now + cycles as f32 * self.animation.duration();
                self.state = CrawlerState::Idle;
            }
            CrawlerState::Walk => {
                self.animation.restart(self.walk_clip, clips);
                let cycles = rng.gen_range(WALK_CYCLES);
                self.next_think = now + cycles as f32 * self.animation.duration();
                self.speed_scale = rng.gen_range(SPEED_SCALE);
                self.state = CrawlerState::Walk;
            }
            CrawlerState::Dying => {
                if self.behavior.stomp == StompRule::DowngradeThenKill && !self.jumped_on {
                    debug!(crawler = self.id.get(), "crawler downgraded");
                    self.jumped_on = true;
                    self.behavior = CrawlerKind::Weak.behavior();
                    (self.idle_clip, self.walk_clip) = clips_for(CrawlerKind::Weak);
                    self.enter(CrawlerState::Walk, Thinking { clips, now, rng });
                    return;
                }
                self.animation.restart(ClipKey::CrawlerDie, clips);
                self.time_to_death = self.animation.duration();
                self.state = CrawlerState::Dying;
            }
            CrawlerState::Dead => {
                self.state = CrawlerState::Dead;
            }
        }
        debug!(crawler = self.id.get(), state = ?self.state, "crawler state changed");
    }

    pub(crate) fn update<R: Rng>(
        &mut self,
        dt: f32,
        grid: &TileGrid,
        tuning: &Tuning,
        thinking: Thinking<'_, R>,
    ) {
        match self.state {
            CrawlerState::Init | CrawlerState::Dead => {}
            CrawlerState::Idle => {
                if thinking.now >= self.next_think {
                    self.enter(CrawlerState::Walk, thinking);
                } else {
                    self.animation.advance(dt);
                }
            }
            CrawlerState::Walk => {
                if thinking.now >= self.next_think {
                    self.enter(CrawlerState::Idle, thinking);
                } else {
                    self.animation.advance(dt * self.speed_scale);
                    self.walk(dt, grid, tuning);
                }
            }
            CrawlerState::Dying => {
                self.animation.advance(dt);
                self.time_to_death -= dt;
                if self.time_to_death <= 0.0 {
                    self.enter(CrawlerState::Dead, thinking);
                }
            }
        }
        self.collision = self.compute_collision();
    }

    fn walk(&mut self, dt: f32, grid: &TileGrid, tuning: &Tuning) {
        let previous = self.x;
        self.x += dt * tuning.crawler_speed * self.speed_scale * self.facing.sign();
        let width = self.animation.frame_width();

        if self.x < 0.0 {
            self.x = 0.0;
            self.facing = self.facing.reversed();
            return;
        }
        if self.x + width >= tuning.screen_width {
            self.x = tuning.screen_width - 1.0 - width;
            self.facing = self.facing.reversed();
            return;
        }
        if !self.behavior.ledge_sensing {
            return;
        }

        let collision = self.compute_collision();
        let probe_x = match self.facing {
            Facing::Left => collision.left(),
            Facing::Right => collision.right(),
        };
        let ahead = grid.tile_at(probe_x, self.bottom + PROBE_EPSILON);
        self.sensed_tile = Some(ahead.rect());
        if ahead.is_empty() {
            self.x = previous;
            self.facing = self.facing.reversed();
        }
    }

    fn compute_collision(&self) -> Rect {
        let screen = self.screen_rect();
        screen.inset(
            screen.w / 5.0,
            screen.w - screen.w / 5.0 - screen.w * 2.0 / 3.0,
            screen.h * 3.0 / 4.0,
            0.0,
        )
    }
}

fn clips_for(kind: CrawlerKind) -> (ClipKey, ClipKey) {
    match kind {
        CrawlerKind::Weak => (ClipKey::CrawlerIdle, ClipKey::CrawlerWalk),
        CrawlerKind::Strong => (ClipKey::StrongCrawlerIdle, ClipKey::StrongCrawlerWalk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use robot_run_core::{LevelLayout, TileKind, TileSet};

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        clips: ClipLibrary,
        tuning: Tuning,
        grid: TileGrid,
        rng: ChaCha8Rng,
        now: f32,
    }

    impl Harness {
        /// Floor spanning columns `floor_from..floor_to` of a 20x15 grid.
        fn new(floor_from: usize, floor_to: usize) -> Self {
            let mut tiles = vec![TileKind::Empty; 20 * 15];
            for column in floor_from..floor_to {
                tiles[14 * 20 + column] = TileKind::Solid(TileSet::Primary);
            }
            Self {
                clips: ClipLibrary::standard(),
                tuning: Tuning::default(),
                grid: TileGrid::from_layout(&LevelLayout::new(20, 15, tiles, Vec::new()), 32.0, 32.0),
                rng: ChaCha8Rng::seed_from_u64(7),
                now: 0.0,
            }
        }

        fn thinking(&mut self) -> Thinking<'_, ChaCha8Rng> {
            Thinking {
                clips: &self.clips,
                now: self.now,
                rng: &mut self.rng,
            }
        }

        fn spawn(&mut self, kind: CrawlerKind, x: f32, facing: Facing) -> Crawler {
            let thinking = self.thinking();
            Crawler::spawn(CrawlerId::new(0), kind, x, 448.0, facing, thinking)
        }

        fn step(&mut self, crawler: &mut Crawler) {
            self.now += DT;
            let thinking = Thinking {
                clips: &self.clips,
                now: self.now,
                rng: &mut self.rng,
            };
            crawler.update(DT, &self.grid, &self.tuning, thinking);
        }
    }

    #[test]
    fn spawn_leaves_init_immediately() {
        let mut harness = Harness::new(0, 20);
        for seed in 0..16 {
            harness.rng = ChaCha8Rng::seed_from_u64(seed);
            let crawler = harness.spawn(CrawlerKind::Weak, 100.0, Facing::Left);
            assert!(matches!(
                crawler.state(),
                CrawlerState::Idle | CrawlerState::Walk
            ));
            assert!(crawler.next_think() > 0.0);
        }
    }

    #[test]
    fn requesting_the_current_state_changes_nothing() {
        let mut harness = Harness::new(0, 20);
        let mut crawler = harness.spawn(CrawlerKind::Weak, 100.0, Facing::Left);
        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Walk, thinking);
        let next_think = crawler.next_think();
        let speed_scale = crawler.speed_scale();

        harness.now = 0.25;
        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Walk, thinking);

        assert_eq!(crawler.next_think(), next_think);
        assert_eq!(crawler.speed_scale(), speed_scale);
        assert!((0.5..=2.0).contains(&speed_scale));
    }

    #[test]
    fn weak_crawler_turns_around_at_the_screen_edge_and_then_idles() {
        let mut harness = Harness::new(0, 20);
        let mut crawler = harness.spawn(CrawlerKind::Weak, 0.0, Facing::Left);
        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Walk, thinking);
        let walk_ends = crawler.next_think();

        harness.step(&mut crawler);
        assert_eq!(crawler.facing(), Facing::Right);
        assert_eq!(crawler.state(), CrawlerState::Walk);

        while harness.now < walk_ends {
            assert_eq!(crawler.state(), CrawlerState::Walk);
            harness.step(&mut crawler);
        }

        assert_eq!(crawler.state(), CrawlerState::Idle);
        assert!(crawler.next_think() > walk_ends);
    }

    #[test]
    fn ledge_sensing_crawler_stays_on_its_platform() {
        let mut harness = Harness::new(2, 8);
        let mut crawler = harness.spawn(CrawlerKind::Weak, 100.0, Facing::Right);

        for _ in 0..3_000 {
            harness.step(&mut crawler);
            let collision = crawler.collision_rect();
            assert!(collision.left() >= 64.0, "walked off the left ledge");
            assert!(collision.right() <= 256.0, "walked off the right ledge");
        }
        assert!(crawler.sensed_tile().is_some());
    }

    #[test]
    fn strong_crawler_needs_two_stomps() {
        let mut harness = Harness::new(0, 20);
        let mut crawler = harness.spawn(CrawlerKind::Strong, 300.0, Facing::Left);
        assert!(!crawler.jumped_on());
        assert!(!crawler.behavior().ledge_sensing);

        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Dying, thinking);
        assert_eq!(crawler.state(), CrawlerState::Walk);
        assert!(crawler.jumped_on());
        assert!(crawler.behavior().ledge_sensing);
        assert_eq!(crawler.animation().key(), ClipKey::CrawlerWalk);

        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Dying, thinking);
        assert_eq!(crawler.state(), CrawlerState::Dying);

        let death = crawler.time_to_death();
        let mut elapsed = 0.0;
        while crawler.state() == CrawlerState::Dying {
            harness.step(&mut crawler);
            elapsed += DT;
        }
        assert_eq!(crawler.state(), CrawlerState::Dead);
        assert!(elapsed >= death - DT);
    }

    #[test]
    fn dying_crawlers_ignore_patrol_requests() {
        let mut harness = Harness::new(0, 20);
        let mut crawler = harness.spawn(CrawlerKind::Weak, 300.0, Facing::Left);
        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Dying, thinking);

        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Walk, thinking);
        assert_eq!(crawler.state(), CrawlerState::Dying);

        let thinking = harness.thinking();
        crawler.set_state(CrawlerState::Idle, thinking);
        assert_eq!(crawler.state(), CrawlerState::Dying);
    }

    #[test]
    fn collision_rect_hugs_the_bottom_of_the_sprite() {
        let mut harness = Harness::new(0, 20);
        let crawler = harness.spawn(CrawlerKind::Weak, 100.0, Facing::Left);
        let screen = crawler.screen_rect();
        let collision = crawler.collision_rect();

        assert!(screen.contains_rect(&collision));
        assert_eq!(collision.bottom(), screen.bottom());
        assert!((collision.h - screen.h / 4.0).abs() < 1e-4);
    }
}
