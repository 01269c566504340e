//! TOML configuration file support.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use robot_run_core::{ClipKey, ClipLibrary, ClipSpec, SceneIndex, Tuning};
use robot_run_rendering_macroquad::WindowSettings;
use robot_run_system_meteor_shower::Config as MeteorShowerConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything the `--config` file may set; omitted tables keep defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) tuning: Tuning,
    pub(crate) meteor_shower: MeteorShowerSettings,
    pub(crate) window: WindowSettings,
    /// Clip overrides keyed by clip name, e.g. `[clips.robot_run]`.
    pub(crate) clips: BTreeMap<String, ClipSpec>,
}

impl GameConfig {
    /// Standard clips with the configured overrides applied.
    pub(crate) fn clip_library(&self) -> ClipLibrary {
        let mut library = ClipLibrary::standard();
        library.extend(self.clips.iter().filter_map(|(name, spec)| {
            let key = ClipKey::from_name(name);
            if key.is_none() {
                warn!(clip = %name, "ignoring override for unknown clip");
            }
            key.map(|key| (key, *spec))
        }));
        library
    }
}

/// Meteor cadence and spin, in seconds and degrees per second.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct MeteorShowerSettings {
    pub(crate) min_interval: f32,
    pub(crate) max_interval: f32,
    pub(crate) min_rotation_speed: f32,
    pub(crate) max_rotation_speed: f32,
}

impl Default for MeteorShowerSettings {
    fn default() -> Self {
        Self {
            min_interval: 1.5,
            max_interval: 3.5,
            min_rotation_speed: 45.0,
            max_rotation_speed: 180.0,
        }
    }
}

impl MeteorShowerSettings {
    pub(crate) fn to_config(self, tuning: &Tuning) -> MeteorShowerConfig {
        MeteorShowerConfig::new(
            SceneIndex::new(tuning.meteor_scene),
            seconds(self.min_interval),
            seconds(self.max_interval),
            tuning.screen_width,
            tuning.seed,
        )
        .with_rotation_speeds(self.min_rotation_speed, self.max_rotation_speed)
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// Reads the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
