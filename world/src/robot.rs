//! Player-controlled robot and its jump, fall and death physics.

use robot_run_core::{
    Action, ClipKey, ClipLibrary, Event, Facing, InputSnapshot, Rect, SoundCue, Tuning,
};

use crate::{animation::Animation, grid::TileGrid};

/// Distance the robot may travel past either screen edge before a scene change.
const EDGE_MARGIN: f32 = 10.0;
/// Offset used when probing the cell just beyond an edge.
const PROBE_EPSILON: f32 = 0.01;

/// Collision insets as fractions of the sprite size, for a robot facing right.
const INSET_BACK: f32 = 0.3;
const INSET_FRONT: f32 = 0.2;
const INSET_TOP: f32 = 0.15;

/// Movement state of the robot together with the data each state needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RobotState {
    /// Standing or running on solid ground.
    Grounded,
    /// Airborne after a jump or bounce.
    Jumping {
        /// Vertical velocity in pixels per second; negative is upwards.
        velocity: f32,
    },
    /// Airborne after walking off a ledge.
    Falling {
        /// Vertical velocity in pixels per second; negative is upwards.
        velocity: f32,
    },
    /// Killed; only gravity applies until resurrection.
    Dead {
        /// Vertical velocity in pixels per second; negative is upwards.
        velocity: f32,
    },
    /// Walking to the flagpole without player control.
    AutoPilot {
        /// Whether the flagpole has been passed.
        celebrating: bool,
    },
}

impl RobotState {
    /// Vertical velocity carried by the state; zero when not moving vertically.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        match self {
            Self::Jumping { velocity } | Self::Falling { velocity } | Self::Dead { velocity } => {
                *velocity
            }
            Self::Grounded | Self::AutoPilot { .. } => 0.0,
        }
    }

    /// Whether the robot is jumping or falling.
    #[must_use]
    pub const fn is_airborne(&self) -> bool {
        matches!(self, Self::Jumping { .. } | Self::Falling { .. })
    }
}

/// Side effect of a robot update that the world must carry out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RobotOutcome {
    Stay,
    AdvanceScene,
    RetreatScene,
    Resurrected,
    GoalReached,
}

/// Read-only context the robot consults while updating.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Surroundings<'a> {
    pub(crate) grid: &'a TileGrid,
    pub(crate) tuning: &'a Tuning,
    pub(crate) clips: &'a ClipLibrary,
    pub(crate) first_scene: bool,
    pub(crate) final_scene: bool,
}

/// The player-controlled robot.
#[derive(Clone, Debug)]
pub struct Robot {
    x: f32,
    bottom: f32,
    facing: Facing,
    state: RobotState,
    jump_latched: bool,
    lives: u32,
    invulnerable: f32,
    animation: Animation,
    collision: Rect,
    feet_probe: Rect,
    head_probe: Rect,
    previous_bottom: f32,
    descending: bool,
    grayscale: bool,
}

impl Robot {
    pub(crate) fn new(tuning: &Tuning, clips: &ClipLibrary) -> Self {
        let mut robot = Self {
            x: tuning.spawn_x,
            bottom: tuning.spawn_bottom,
            facing: Facing::Right,
            state: RobotState::Grounded,
            jump_latched: false,
            lives: tuning.starting_lives,
            invulnerable: 0.0,
            animation: Animation::new(ClipKey::RobotIdle, clips),
            collision: Rect::default(),
            feet_probe: Rect::default(),
            head_probe: Rect::default(),
            previous_bottom: tuning.spawn_bottom,
            descending: false,
            grayscale: false,
        };
        robot.collision = robot.compute_collision();
        robot
    }

    /// Left edge of the sprite.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Feet of the sprite.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Direction the robot is facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Current movement state.
    #[must_use]
    pub const fn state(&self) -> RobotState {
        self.state
    }

    /// Current vertical velocity.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.state.velocity()
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Whether the robot has been killed and not yet resurrected.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        matches!(self.state, RobotState::Dead { .. })
    }

    /// Seconds of post-resurrection grace left.
    #[must_use]
    pub const fn invulnerability_remaining(&self) -> f32 {
        self.invulnerable
    }

    /// Whether crawlers and meteors can currently hurt the robot.
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        self.invulnerable <= 0.0
            && !matches!(
                self.state,
                RobotState::Dead { .. } | RobotState::AutoPilot { .. }
            )
    }

    /// Whether the robot should be drawn this frame; it blinks while invulnerable.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.invulnerable <= 0.0 || ((self.invulnerable * 10.0) as u32) % 2 == 0
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

    /// Cell probed beneath the robot's feet.
    #[must_use]
    pub const fn feet_probe(&self) -> Rect {
        self.feet_probe
    }

    /// Cell probed above the robot's head.
    #[must_use]
    pub const fn head_probe(&self) -> Rect {
        self.head_probe
    }

    /// Whether the robot should be drawn without colour.
    #[must_use]
    pub const fn grayscale(&self) -> bool {
        self.grayscale
    }

    /// Feet position at the start of the latest update.
    pub(crate) const fn previous_bottom(&self) -> f32 {
        self.previous_bottom
    }

    /// Whether the robot moved downwards through the air during the latest update.
    pub(crate) const fn stomp_ready(&self) -> bool {
        self.descending
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub(crate) fn gain_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_add(1);
        self.lives
    }

    pub(crate) fn tick_flash(&mut self, dt: f32) {
        self.invulnerable = (self.invulnerable - dt).max(0.0);
    }

    /// Sets the vertical velocity directly, killing the robot when requested.
    pub(crate) fn bounce(&mut self, velocity: f32, killed: bool, clips: &ClipLibrary) {
        if killed {
            self.state = RobotState::Dead { velocity };
            self.animation.restart(ClipKey::RobotDie, clips);
            return;
        }
        match self.state {
            RobotState::Dead { .. } | RobotState::AutoPilot { .. } => {}
            RobotState::Grounded | RobotState::Jumping { .. } | RobotState::Falling { .. } => {
                self.state = RobotState::Jumping { velocity };
                self.animation.play(ClipKey::RobotJump, clips);
            }
        }
    }

    /// Rests the robot's feet on `surface` and bounces it upwards.
    pub(crate) fn bounce_off(&mut self, surface: f32, velocity: f32, clips: &ClipLibrary) {
        self.bottom = self.bottom.min(surface);
        self.bounce(velocity, false, clips);
        self.collision = self.compute_collision();
    }

    /// Hands control to the auto-pilot if the robot is standing on the ground.
    pub(crate) fn engage_autopilot(&mut self) -> bool {
        if self.state != RobotState::Grounded {
            return false;
        }
        self.state = RobotState::AutoPilot { celebrating: false };
        true
    }

    /// Recomputes the collision rectangle and tile probes.
    pub(crate) fn refresh(&mut self, grid: &TileGrid) {
        self.collision = self.compute_collision();
        let center_x = self.collision.center_x();
        self.feet_probe = grid.tile_at(center_x, self.bottom + PROBE_EPSILON).rect();
        self.head_probe = grid
            .tile_at(center_x, self.collision.top() - PROBE_EPSILON)
            .rect();
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        input: InputSnapshot,
        env: &Surroundings<'_>,
        out: &mut Vec<Event>,
    ) -> RobotOutcome {
        self.previous_bottom = self.bottom;
        self.descending = false;
        if !input.is_down(Action::Jump) {
            self.jump_latched = false;
        }

        let outcome = match self.state {
            RobotState::Dead { velocity } => self.update_dead(velocity, dt, input, env),
            RobotState::AutoPilot { celebrating } => self.update_autopilot(celebrating, dt, env),
            RobotState::Grounded | RobotState::Jumping { .. } | RobotState::Falling { .. } => {
                self.update_active(dt, input, env, out)
            }
        };

        self.animation.advance(dt);
        self.refresh(env.grid);
        outcome
    }

    fn update_active(
        &mut self,
        dt: f32,
        input: InputSnapshot,
        env: &Surroundings<'_>,
        out: &mut Vec<Event>,
    ) -> RobotOutcome {
        let tuning = env.tuning;
        let left = input.is_down(Action::Left);
        let right = input.is_down(Action::Right);
        let running = left != right;
        if running {
            self.facing = if left { Facing::Left } else { Facing::Right };
            self.x += self.facing.sign() * (tuning.run_speed * dt).ceil();
        }

        let outcome = self.resolve_screen_edges(env);
        if outcome != RobotOutcome::Stay {
            return outcome;
        }

        if self.state == RobotState::Grounded {
            if input.is_down(Action::Jump) && !self.jump_latched {
                self.jump_latched = true;
                self.state = RobotState::Jumping {
                    velocity: -tuning.jump_velocity,
                };
                out.push(Event::SoundTriggered {
                    cue: SoundCue::Jump,
                });
            } else if !self.ground_beneath(env.grid) {
                self.state = RobotState::Falling { velocity: 0.0 };
            }
        }

        if let RobotState::Jumping { velocity } | RobotState::Falling { velocity } = self.state {
            let velocity = velocity + tuning.gravity * dt;
            if velocity < 0.0 {
                self.rise(velocity, dt, env.grid, out);
            } else {
                self.descending = velocity > 0.0;
                if self.descend(velocity * dt, env.grid) {
                    self.state = RobotState::Grounded;
                } else {
                    self.state = match self.state {
                        RobotState::Falling { .. } => RobotState::Falling { velocity },
                        _ => RobotState::Jumping { velocity },
                    };
                }
            }
        }

        let clip = match self.state {
            RobotState::Grounded if running => ClipKey::RobotRun,
            RobotState::Grounded => ClipKey::RobotIdle,
            _ => ClipKey::RobotJump,
        };
        self.animation.play(clip, env.clips);
        RobotOutcome::Stay
    }

    fn update_dead(
        &mut self,
        velocity: f32,
        dt: f32,
        input: InputSnapshot,
        env: &Surroundings<'_>,
    ) -> RobotOutcome {
        if velocity == 0.0 && self.ground_beneath(env.grid) {
            if input.is_down(Action::Resurrect) && self.lives > 0 {
                self.resurrect(env.tuning, env.clips);
                return RobotOutcome::Resurrected;
            }
            return RobotOutcome::Stay;
        }

        let velocity = velocity + env.tuning.gravity * dt;
        let landed = if velocity > 0.0 {
            self.descend(velocity * dt, env.grid)
        } else {
            self.bottom += velocity * dt;
            false
        };
        self.state = RobotState::Dead {
            velocity: if landed { 0.0 } else { velocity },
        };
        RobotOutcome::Stay
    }

    fn update_autopilot(
        &mut self,
        celebrating: bool,
        dt: f32,
        env: &Surroundings<'_>,
    ) -> RobotOutcome {
        if celebrating {
            return RobotOutcome::Stay;
        }

        self.facing = Facing::Right;
        self.x += (env.tuning.run_speed * dt).ceil();
        self.animation.play(ClipKey::RobotRun, env.clips);
        if self.x > env.tuning.flagpole_x {
            self.state = RobotState::AutoPilot { celebrating: true };
            self.animation.restart(ClipKey::RobotCelebrate, env.clips);
            return RobotOutcome::GoalReached;
        }
        RobotOutcome::Stay
    }

    fn resurrect(&mut self, tuning: &Tuning, clips: &ClipLibrary) {
        self.x = tuning.spawn_x;
        self.bottom = tuning.spawn_bottom;
        self.previous_bottom = tuning.spawn_bottom;
        self.facing = Facing::Right;
        self.state = RobotState::Grounded;
        self.invulnerable = tuning.invulnerability;
        self.animation.restart(ClipKey::RobotIdle, clips);
    }

    fn resolve_screen_edges(&mut self, env: &Surroundings<'_>) -> RobotOutcome {
        let width = self.animation.frame_width();
        let screen_width = env.tuning.screen_width;
        let right_limit = screen_width + EDGE_MARGIN - width;

        if self.x < -EDGE_MARGIN {
            if env.first_scene {
                self.x = -EDGE_MARGIN;
                return RobotOutcome::Stay;
            }
            self.x = screen_width - width;
            return RobotOutcome::RetreatScene;
        }

        if self.x >= right_limit {
            if env.final_scene {
                self.x = right_limit;
                return RobotOutcome::Stay;
            }
            self.x = -EDGE_MARGIN;
            return RobotOutcome::AdvanceScene;
        }

        RobotOutcome::Stay
    }

    /// Moves upwards by `velocity * dt`, bouncing off the first blocking cell above.
    fn rise(&mut self, velocity: f32, dt: f32, grid: &TileGrid, out: &mut Vec<Event>) {
        let collision = self.compute_collision();
        let head = collision.top();
        let dy = velocity * dt;
        let column = grid.column_at(collision.center_x());
        let mut row = grid.row_at(head) - 1;
        let last = grid.row_at(head + dy);

        while row >= last {
            let tile = grid.tile(row, column);
            if tile.blocks() {
                self.bottom += tile.rect().bottom() - head;
                self.state = RobotState::Jumping {
                    velocity: -velocity,
                };
                out.push(Event::SoundTriggered {
                    cue: SoundCue::Block,
                });
                return;
            }
            row -= 1;
        }

        self.bottom += dy;
        self.state = match self.state {
            RobotState::Falling { .. } => RobotState::Falling { velocity },
            _ => RobotState::Jumping { velocity },
        };
    }

    /// Moves downwards by `dy`, snapping onto the first blocking cell crossed.
    fn descend(&mut self, dy: f32, grid: &TileGrid) -> bool {
        let tile_height = grid.tile_height();
        let column = grid.column_at(self.compute_collision().center_x());
        let first = (self.bottom / tile_height).ceil() as i64;
        let last = ((self.bottom + dy) / tile_height).floor() as i64;

        for row in first..=last {
            if grid.tile(row, column).blocks() {
                self.bottom = row as f32 * tile_height;
                return true;
            }
        }

        self.bottom += dy;
        false
    }

    fn ground_beneath(&self, grid: &TileGrid) -> bool {
        let center_x = self.compute_collision().center_x();
        grid.blocks_at(center_x, self.bottom + PROBE_EPSILON)
    }

    fn compute_collision(&self) -> Rect {
        let screen = self.screen_rect();
        let (left, right) = match self.facing {
            Facing::Right => (INSET_BACK * screen.w, INSET_FRONT * screen.w),
            Facing::Left => (INSET_FRONT * screen.w, INSET_BACK * screen.w),
        };
        screen.inset(left, right, INSET_TOP * screen.h, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_run_core::{LevelLayout, TileKind, TileSet};

    const DT: f32 = 1.0 / 60.0;

    /// 20x15 grid with a solid floor row and an optional ceiling tile row.
    fn grid(ceiling_row: Option<u32>) -> TileGrid {
        let mut tiles = vec![TileKind::Empty; 20 * 15];
        for column in 0..20 {
            tiles[14 * 20 + column] = TileKind::Solid(TileSet::Primary);
            if let Some(row) = ceiling_row {
                tiles[row as usize * 20 + column] = TileKind::Solid(TileSet::Secondary);
            }
        }
        TileGrid::from_layout(&LevelLayout::new(20, 15, tiles, Vec::new()), 32.0, 32.0)
    }

    fn surroundings<'a>(
        grid: &'a TileGrid,
        tuning: &'a Tuning,
        clips: &'a ClipLibrary,
    ) -> Surroundings<'a> {
        Surroundings {
            grid,
            tuning,
            clips,
            first_scene: true,
            final_scene: false,
        }
    }

    fn jump_sounds(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|event| {
                **event
                    == Event::SoundTriggered {
                        cue: SoundCue::Jump,
                    }
            })
            .count()
    }

    #[test]
    fn collision_rect_stays_inside_and_mirrors_with_facing() {
        let tuning = Tuning::default();
        let clips = ClipLibrary::standard();
        let grid = grid(None);
        let mut robot = Robot::new(&tuning, &clips);
        robot.refresh(&grid);
        let facing_right = robot.collision_rect();

        robot.facing = Facing::Left;
        robot.refresh(&grid);
        let facing_left = robot.collision_rect();

        assert!(robot.screen_rect().contains_rect(&facing_right));
        assert!(robot.screen_rect().contains_rect(&facing_left));
        assert!(facing_left.x < facing_right.x);
        assert_eq!(facing_left.w, facing_right.w);
        assert_eq!(facing_right.bottom(), robot.bottom());
    }

    #[test]
    fn holding_jump_only_jumps_once() {
        let tuning = Tuning::default();
        let clips = ClipLibrary::standard();
        let grid = grid(None);
        let env = surroundings(&grid, &tuning, &clips);
        let mut robot = Robot::new(&tuning, &clips);
        let jump = InputSnapshot::new().with(Action::Jump);
        let mut events = Vec::new();

        for _ in 0..180 {
            let _ = robot.update(DT, jump, &env, &mut events);
        }
        assert_eq!(jump_sounds(&events), 1);
        assert_eq!(robot.state(), RobotState::Grounded);

        let _ = robot.update(DT, InputSnapshot::new(), &env, &mut events);
        let _ = robot.update(DT, jump, &env, &mut events);
        assert_eq!(jump_sounds(&events), 2);
        assert!(robot.state().is_airborne());
    }

    #[test]
    fn ceiling_reverses_upward_velocity() {
        let tuning = Tuning::default();
        let clips = ClipLibrary::standard();
        let grid = grid(Some(11));
        let env = surroundings(&grid, &tuning, &clips);
        let mut robot = Robot::new(&tuning, &clips);
        let mut events = Vec::new();

        let _ = robot.update(DT, InputSnapshot::new().with(Action::Jump), &env, &mut events);

        assert!(events.contains(&Event::SoundTriggered {
            cue: SoundCue::Block,
        }));
        assert!(robot.velocity() > 0.0);
        assert!(robot.collision_rect().top() >= 12.0 * 32.0 - 0.01);
    }

    #[test]
    fn dead_robot_ignores_movement_input() {
        let tuning = Tuning::default();
        let clips = ClipLibrary::standard();
        let grid = grid(None);
        let env = surroundings(&grid, &tuning, &clips);
        let mut robot = Robot::new(&tuning, &clips);
        robot.bounce(-tuning.death_bounce, true, &clips);
        let start_x = robot.x();
        let input = InputSnapshot::new().with(Action::Right).with(Action::Jump);
        let mut events = Vec::new();

        for _ in 0..120 {
            let _ = robot.update(DT, input, &env, &mut events);
        }

        assert_eq!(robot.x(), start_x);
        assert_eq!(robot.state(), RobotState::Dead { velocity: 0.0 });
        assert_eq!(robot.bottom(), 448.0);
        assert!(events.is_empty());
    }

    #[test]
    fn resurrection_requires_settled_body_and_lives() {
        let tuning = Tuning::default();
        let clips = ClipLibrary::standard();
        let grid = grid(None);
        let env = surroundings(&grid, &tuning, &clips);
        let mut robot = Robot::new(&tuning, &clips);
        robot.bounce(-tuning.death_bounce, true, &clips);
        let resurrect = InputSnapshot::new().with(Action::Resurrect);
        let mut events = Vec::new();

        assert_eq!(
            robot.update(DT, resurrect, &env, &mut events),
            RobotOutcome::Stay
        );

        let mut outcome = RobotOutcome::Stay;
        for _ in 0..120 {
            outcome = robot.update(DT, resurrect, &env, &mut events);
            if outcome != RobotOutcome::Stay {
                break;
            }
        }

        assert_eq!(outcome, RobotOutcome::Resurrected);
        assert_eq!(robot.state(), RobotState::Grounded);
        assert!(!robot.is_vulnerable());
        assert!(robot.invulnerability_remaining() > 0.0);
    }

    #[test]
    fn autopilot_celebrates_past_the_flagpole() {
        let tuning = Tuning::default();
        let clips = ClipLibrary::standard();
        let grid = grid(None);
        let env = surroundings(&grid, &tuning, &clips);
        let mut robot = Robot::new(&tuning, &clips);
        assert!(robot.engage_autopilot());
        let mut events = Vec::new();

        let mut reached = false;
        for _ in 0..600 {
            if robot.update(DT, InputSnapshot::new().with(Action::Left), &env, &mut events)
                == RobotOutcome::GoalReached
            {
                reached = true;
                break;
            }
        }

        assert!(reached);
        assert!(robot.x() > tuning.flagpole_x);
        assert_eq!(robot.animation().key(), ClipKey::RobotCelebrate);
    }
}
