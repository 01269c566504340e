//! Animation clip contracts consumed by the world.
//!
//! The simulation never inspects pixels. It only needs the frame size of the
//! clip an entity is showing, how long one loop of the clip lasts, and whether
//! a non-looping clip has finished.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Size used by the placeholder substituted for missing clips.
const PLACEHOLDER_SIZE: f32 = 32.0;

/// Identifies every animation clip the game can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClipKey {
    /// Robot standing still.
    RobotIdle,
    /// Robot running.
    RobotRun,
    /// Robot airborne.
    RobotJump,
    /// Robot death, played once.
    RobotDie,
    /// Robot celebrating at the flagpole.
    RobotCelebrate,
    /// Weak crawler standing still.
    CrawlerIdle,
    /// Weak crawler walking.
    CrawlerWalk,
    /// Strong crawler standing still.
    StrongCrawlerIdle,
    /// Strong crawler walking.
    StrongCrawlerWalk,
    /// Crawler death, played once.
    CrawlerDie,
    /// Spinning coin.
    Coin,
    /// Falling meteor.
    Meteor,
    /// Meteor explosion, played once.
    Explosion,
}

impl ClipKey {
    /// Every clip key in declaration order.
    pub const ALL: [ClipKey; 13] = [
        ClipKey::RobotIdle,
        ClipKey::RobotRun,
        ClipKey::RobotJump,
        ClipKey::RobotDie,
        ClipKey::RobotCelebrate,
        ClipKey::CrawlerIdle,
        ClipKey::CrawlerWalk,
        ClipKey::StrongCrawlerIdle,
        ClipKey::StrongCrawlerWalk,
        ClipKey::CrawlerDie,
        ClipKey::Coin,
        ClipKey::Meteor,
        ClipKey::Explosion,
    ];

    /// Snake-case name used by clip manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RobotIdle => "robot_idle",
            Self::RobotRun => "robot_run",
            Self::RobotJump => "robot_jump",
            Self::RobotDie => "robot_die",
            Self::RobotCelebrate => "robot_celebrate",
            Self::CrawlerIdle => "crawler_idle",
            Self::CrawlerWalk => "crawler_walk",
            Self::StrongCrawlerIdle => "strong_crawler_idle",
            Self::StrongCrawlerWalk => "strong_crawler_walk",
            Self::CrawlerDie => "crawler_die",
            Self::Coin => "coin",
            Self::Meteor => "meteor",
            Self::Explosion => "explosion",
        }
    }

    /// Looks up a key by its manifest name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

/// Frame geometry and timing of a single animation clip.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ClipSpec {
    /// Width of every frame in pixels.
    pub frame_width: f32,
    /// Height of every frame in pixels.
    pub frame_height: f32,
    /// Number of frames in the clip.
    pub frames: u32,
    /// Seconds taken to play every frame once.
    pub duration: f32,
    /// Whether the clip restarts after the last frame.
    #[serde(default = "default_looping")]
    pub looping: bool,
    /// Marks a stand-in for a clip that could not be found.
    #[serde(skip)]
    pub placeholder: bool,
}

fn default_looping() -> bool {
    true
}

impl ClipSpec {
    /// Creates a clip description.
    #[must_use]
    pub const fn new(
        frame_width: f32,
        frame_height: f32,
        frames: u32,
        duration: f32,
        looping: bool,
    ) -> Self {
        Self {
            frame_width,
            frame_height,
            frames,
            duration,
            looping,
            placeholder: false,
        }
    }

    /// Visibly distinct single-frame clip used when a lookup misses.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            frame_width: PLACEHOLDER_SIZE,
            frame_height: PLACEHOLDER_SIZE,
            frames: 1,
            duration: 1.0,
            looping: true,
            placeholder: true,
        }
    }
}

/// Lookup table from clip keys to their specifications.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipLibrary {
    clips: BTreeMap<ClipKey, ClipSpec>,
}

impl ClipLibrary {
    /// Library without any clips; every lookup resolves to the placeholder.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Clip set matching the bundled sprite sheets.
    #[must_use]
    pub fn standard() -> Self {
        let mut library = Self::empty();
        let clips = [
            (ClipKey::RobotIdle, ClipSpec::new(48.0, 64.0, 4, 1.0, true)),
            (ClipKey::RobotRun, ClipSpec::new(48.0, 64.0, 8, 0.5, true)),
            (ClipKey::RobotJump, ClipSpec::new(48.0, 64.0, 4, 0.5, true)),
            (ClipKey::RobotDie, ClipSpec::new(48.0, 64.0, 8, 1.0, false)),
            (
                ClipKey::RobotCelebrate,
                ClipSpec::new(48.0, 64.0, 6, 1.0, true),
            ),
            (
                ClipKey::CrawlerIdle,
                ClipSpec::new(64.0, 64.0, 4, 0.5, true),
            ),
            (
                ClipKey::CrawlerWalk,
                ClipSpec::new(64.0, 64.0, 8, 0.5, true),
            ),
            (
                ClipKey::StrongCrawlerIdle,
                ClipSpec::new(64.0, 64.0, 4, 0.5, true),
            ),
            (
                ClipKey::StrongCrawlerWalk,
                ClipSpec::new(64.0, 64.0, 8, 0.5, true),
            ),
            (
                ClipKey::CrawlerDie,
                ClipSpec::new(64.0, 64.0, 6, 0.5, false),
            ),
            (ClipKey::Coin, ClipSpec::new(32.0, 32.0, 8, 0.75, true)),
            (ClipKey::Meteor, ClipSpec::new(48.0, 48.0, 1, 1.0, true)),
            (
                ClipKey::Explosion,
                ClipSpec::new(96.0, 96.0, 23, 1.15, false),
            ),
        ];
        for (key, spec) in clips {
            library.insert(key, spec);
        }
        library
    }

    /// Registers or replaces the clip stored under `key`.
    pub fn insert(&mut self, key: ClipKey, spec: ClipSpec) {
        let _ = self.clips.insert(key, spec);
    }

    /// Applies every override on top of the existing clips.
    pub fn extend<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (ClipKey, ClipSpec)>,
    {
        for (key, spec) in overrides {
            self.insert(key, spec);
        }
    }

    /// Reports whether a clip is registered for `key`.
    #[must_use]
    pub fn contains(&self, key: ClipKey) -> bool {
        self.clips.contains_key(&key)
    }

    /// Retrieves the clip for `key`, substituting the placeholder on a miss.
    #[must_use]
    pub fn resolve(&self, key: ClipKey) -> ClipSpec {
        self.clips
            .get(&key)
            .copied()
            .unwrap_or_else(ClipSpec::placeholder)
    }

    /// Keys that will resolve to the placeholder.
    pub fn missing_keys(&self) -> impl Iterator<Item = ClipKey> + '_ {
        ClipKey::ALL
            .into_iter()
            .filter(move |key| !self.contains(*key))
    }
}
