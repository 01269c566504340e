#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Robot Run engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! presentation layers react to. Nothing in this crate performs I/O; level
//! layouts, animation clips and tuning values arrive fully formed from the
//! adapters that own them.

mod clips;
mod tuning;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use clips::{ClipKey, ClipLibrary, ClipSpec};
pub use tuning::Tuning;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Robot Run.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the ordered list of scenes the world can load.
    ConfigureScenes {
        /// Scene layouts indexed by [`SceneIndex`].
        scenes: Vec<LevelLayout>,
    },
    /// Loads the requested scene, replacing the active grid and entities.
    LoadScene {
        /// Scene that should become active.
        scene: SceneIndex,
        /// Whether crawlers and coins from the layout should be spawned.
        spawn_items: bool,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Logical actions held down during this frame.
        input: InputSnapshot,
    },
    /// Requests that a crawler be added to the active scene.
    SpawnCrawler {
        /// Behavioural variant of the crawler.
        kind: CrawlerKind,
        /// Left edge of the crawler's screen rectangle in pixels.
        x: f32,
        /// Bottom edge of the crawler's screen rectangle in pixels.
        bottom: f32,
        /// Initial walking direction.
        facing: Facing,
    },
    /// Requests that a meteor start falling from above the screen.
    SpawnMeteor {
        /// Horizontal centre of the meteor in pixels.
        center_x: f32,
        /// Cosmetic spin in degrees per second; the sign selects the direction.
        rotation_speed: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that simulation time advanced by the provided duration.
    TimeAdvanced {
        /// Amount of simulated time that elapsed.
        dt: Duration,
    },
    /// Reports that a scene finished loading.
    SceneLoaded {
        /// Scene that is now active.
        scene: SceneIndex,
        /// Whether crawlers and coins were spawned from the layout.
        spawn_items: bool,
    },
    /// Fire-and-forget sound effect request.
    SoundTriggered {
        /// Sound effect that should be played.
        cue: SoundCue,
    },
    /// Music state transition request.
    MusicChanged {
        /// Requested music transition.
        cue: MusicCue,
    },
    /// Announces that a crawler joined the active scene.
    CrawlerSpawned {
        /// Identifier assigned to the crawler.
        crawler: CrawlerId,
        /// Behavioural variant of the crawler.
        kind: CrawlerKind,
    },
    /// Reports that the robot landed on a crawler.
    CrawlerStomped {
        /// Crawler that was stomped.
        crawler: CrawlerId,
        /// Whether the stomp starts the crawler's death rather than a downgrade.
        killed: bool,
    },
    /// Reports that a dead crawler was removed from the active set.
    CrawlerRemoved {
        /// Crawler that was removed.
        crawler: CrawlerId,
    },
    /// Reports that the robot picked up a coin.
    CoinCollected {
        /// Coin that was collected.
        coin: CoinId,
    },
    /// Reports that a collected coin was removed from the scene.
    CoinRemoved {
        /// Coin that was removed.
        coin: CoinId,
    },
    /// Reports the updated score total.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Reports that the robot was awarded an additional life.
    LifeGained {
        /// Lives remaining after the award.
        lives: u32,
    },
    /// Reports that the robot lost a life.
    RobotKilled {
        /// Lives remaining after the loss.
        lives: u32,
    },
    /// Reports that the robot came back to life at the spawn point.
    RobotResurrected,
    /// Reports that the robot ran out of lives.
    GameOver,
    /// Reports that the robot walked past the flagpole in the final scene.
    GoalReached,
    /// Announces that a meteor started falling.
    MeteorSpawned {
        /// Identifier assigned to the meteor.
        meteor: MeteorId,
    },
    /// Reports that a meteor exploded.
    MeteorImpact {
        /// Meteor that exploded.
        meteor: MeteorId,
        /// Whether the meteor struck the robot rather than the ground.
        hit_robot: bool,
    },
}

/// Index of a scene inside the configured scene list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneIndex(u32);

impl SceneIndex {
    /// Creates a new scene index with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the following scene.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Index of the preceding scene, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

/// Unique identifier assigned to a crawler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlerId(u32);

impl CrawlerId {
    /// Creates a new crawler identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a coin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoinId(u32);

impl CoinId {
    /// Creates a new coin identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a meteor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeteorId(u32);

impl MeteorId {
    /// Creates a new meteor identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Horizontal direction an entity is facing or travelling in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Towards decreasing x.
    Left,
    /// Towards increasing x.
    Right,
}

impl Facing {
    /// Unit multiplier applied to horizontal displacement.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Crawler variants that can be spawned by levels or debug input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrawlerKind {
    /// Dies on the first stomp and turns around at platform edges.
    Weak,
    /// Requires two stomps and only turns around at screen edges until downgraded.
    Strong,
}

impl CrawlerKind {
    /// Behaviour descriptor the variant starts with.
    #[must_use]
    pub const fn behavior(self) -> CrawlerBehavior {
        match self {
            Self::Weak => CrawlerBehavior {
                ledge_sensing: true,
                stomp: StompRule::Kill,
            },
            Self::Strong => CrawlerBehavior {
                ledge_sensing: false,
                stomp: StompRule::DowngradeThenKill,
            },
        }
    }
}

/// Small descriptor that parameterises crawler movement and stomp handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CrawlerBehavior {
    /// Whether the crawler probes the tile grid to avoid walking off platforms.
    pub ledge_sensing: bool,
    /// Outcome of a stomp on a crawler that has not yet been jumped on.
    pub stomp: StompRule,
}

/// Outcome of the first valid stomp on a crawler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StompRule {
    /// The crawler starts dying immediately.
    Kill,
    /// The crawler demotes to the weak behaviour and keeps walking.
    DowngradeThenKill,
}

/// AI states a crawler moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrawlerState {
    /// Transient state before the first think.
    Init,
    /// Standing still for a random number of animation cycles.
    Idle,
    /// Patrolling for a random number of animation cycles.
    Walk,
    /// Playing the death animation.
    Dying,
    /// Terminal state; the crawler is removed on the next sweep.
    Dead,
}

/// Named sound effects the core may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// The robot left the ground.
    Jump,
    /// The robot bumped its head on a ceiling tile.
    Block,
    /// A stomp that starts a crawler's death.
    StompKill,
    /// A stomp that only downgrades a crawler.
    StompNoKill,
    /// The robot died.
    Death,
    /// A coin was collected.
    Coin,
    /// A meteor hit the ground.
    Thud,
    /// An extra life was awarded.
    LifeGain,
}

/// Music tracks available to the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Track {
    /// Looping in-game soundtrack.
    Main,
    /// Jingle played once the robot runs out of lives.
    GameOver,
    /// Jingle played once the goal is reached.
    Victory,
}

/// Music state transitions requested by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MusicCue {
    /// Start (or switch to) the provided track from the beginning.
    Play(Track),
    /// Pause the current track.
    Pause,
    /// Resume a paused track.
    Resume,
    /// Stop all music.
    Halt,
}

/// Logical input actions polled from the host each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Run left.
    Left,
    /// Run right.
    Right,
    /// Jump; edge-triggered by the robot.
    Jump,
    /// Come back to life after dying.
    Resurrect,
    /// Toggle the pausable stopwatch.
    Pause,
    /// Toggle collision rectangle overlays.
    ToggleDebugRects,
    /// Cycle music between playing and paused.
    ToggleMusic,
    /// Spawn a weak crawler at a random position.
    SpawnWeakCrawler,
    /// Spawn a strong crawler at a random position.
    SpawnStrongCrawler,
}

impl Action {
    /// Every action in declaration order.
    pub const ALL: [Action; 9] = [
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Resurrect,
        Action::Pause,
        Action::ToggleDebugRects,
        Action::ToggleMusic,
        Action::SpawnWeakCrawler,
        Action::SpawnStrongCrawler,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of actions held down during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputSnapshot {
    held: u16,
}

impl InputSnapshot {
    /// Snapshot with no actions held.
    #[must_use]
    pub const fn new() -> Self {
        Self { held: 0 }
    }

    /// Returns a copy of the snapshot with the provided action held.
    #[must_use]
    pub const fn with(self, action: Action) -> Self {
        Self {
            held: self.held | action.bit(),
        }
    }

    /// Reports whether the provided action is held.
    #[must_use]
    pub const fn is_down(self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    /// Iterates over the held actions.
    pub fn held(self) -> impl Iterator<Item = Action> {
        Action::ALL
            .into_iter()
            .filter(move |action| self.is_down(*action))
    }
}

impl FromIterator<Action> for InputSnapshot {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |snapshot, action| snapshot.with(action))
    }
}

/// Axis-aligned rectangle measured in screen pixels with y growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub w: f32,
    /// Vertical extent.
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Horizontal centre.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }

    /// Vertical centre.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.h * 0.5
    }

    /// Reports whether the horizontal spans of both rectangles intersect.
    #[must_use]
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }

    /// Reports whether the vertical spans of both rectangles intersect.
    #[must_use]
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.top() < other.bottom() && other.top() < self.bottom()
    }

    /// Reports whether both rectangles share a region of positive area.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_horizontally(other) && self.overlaps_vertically(other)
    }

    /// Shrinks the rectangle by the provided edge amounts.
    ///
    /// Insets are clamped so the result always lies within `self` and never
    /// has a negative extent.
    #[must_use]
    pub fn inset(&self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        let width = self.w.max(0.0);
        let height = self.h.max(0.0);
        let left = left.clamp(0.0, width);
        let right = right.clamp(0.0, width - left);
        let top = top.clamp(0.0, height);
        let bottom = bottom.clamp(0.0, height - top);

        Self {
            x: self.x + left,
            y: self.y + top,
            w: width - left - right,
            h: height - top - bottom,
        }
    }

    /// Reports whether `other` lies entirely within `self`.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

/// Texture set used by a solid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileSet {
    /// Tiles written as `#` in level files.
    Primary,
    /// Tiles written as `@` in level files.
    Secondary,
}

/// Contents of a single level cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Passable space.
    #[default]
    Empty,
    /// Solid ground or ceiling drawn with the provided texture set.
    Solid(TileSet),
}

/// Entity placed by a level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    /// A crawler of the provided variant.
    Crawler(CrawlerKind),
    /// A collectible coin.
    Coin,
}

/// Entity placement anchored to a level cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Spawn {
    /// Entity to place.
    pub kind: SpawnKind,
    /// Zero-based column of the cell.
    pub column: u32,
    /// Zero-based row of the cell.
    pub row: u32,
}

/// Parsed tile layout of a single scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
    spawns: Vec<Spawn>,
}

impl LevelLayout {
    /// Creates a layout from row-major tiles and spawn placements.
    ///
    /// Missing tiles are filled with [`TileKind::Empty`] and surplus tiles are
    /// discarded so the tile count always matches `columns * rows`.
    #[must_use]
    pub fn new(columns: u32, rows: u32, mut tiles: Vec<TileKind>, spawns: Vec<Spawn>) -> Self {
        let len = columns as usize * rows as usize;
        tiles.resize(len, TileKind::Empty);
        Self {
            columns,
            rows,
            tiles,
            spawns,
        }
    }

    /// Layout of the provided size with no tiles or spawns.
    #[must_use]
    pub fn empty(columns: u32, rows: u32) -> Self {
        Self::new(columns, rows, Vec::new(), Vec::new())
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile stored at the provided cell, or `None` outside the layout.
    #[must_use]
    pub fn tile(&self, column: u32, row: u32) -> Option<TileKind> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.tiles
            .get(row as usize * self.columns as usize + column as usize)
            .copied()
    }

    /// Row-major tile storage.
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Entity placements declared by the layout.
    #[must_use]
    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }
}
