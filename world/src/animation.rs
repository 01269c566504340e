use robot_run_core::{ClipKey, ClipLibrary, ClipSpec};

/// Playback state of the clip an entity is currently showing.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    key: ClipKey,
    clip: ClipSpec,
    elapsed: f32,
}

impl Animation {
    pub(crate) fn new(key: ClipKey, clips: &ClipLibrary) -> Self {
        Self {
            key,
            clip: clips.resolve(key),
            elapsed: 0.0,
        }
    }

    /// Key of the clip being played.
    #[must_use]
    pub const fn key(&self) -> ClipKey {
        self.key
    }

    /// Whether the clip is a stand-in for a missing asset.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.clip.placeholder
    }

    /// Width of the current frame.
    #[must_use]
    pub const fn frame_width(&self) -> f32 {
        self.clip.frame_width
    }

    /// Height of the current frame.
    #[must_use]
    pub const fn frame_height(&self) -> f32 {
        self.clip.frame_height
    }

    /// Seconds taken to play the clip once.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.clip.duration
    }

    /// Index of the frame that should be drawn.
    #[must_use]
    pub fn frame_index(&self) -> u32 {
        let frames = self.clip.frames.max(1);
        if self.clip.duration <= 0.0 {
            return frames - 1;
        }
        let progress = (self.elapsed / self.clip.duration).clamp(0.0, 1.0);
        ((progress * frames as f32) as u32).min(frames - 1)
    }

    /// Whether a non-looping clip has played through.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.clip.looping && self.elapsed >= self.clip.duration
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }
        self.elapsed += dt.max(0.0);
        if self.clip.looping {
            self.elapsed %= duration;
        } else {
            self.elapsed = self.elapsed.min(duration);
        }
    }

    /// Switches to `key` unless it is already playing.
    pub(crate) fn play(&mut self, key: ClipKey, clips: &ClipLibrary) {
        if self.key != key {
            *self = Self::new(key, clips);
        }
    }

    /// Switches to `key` and rewinds even if it is already playing.
    pub(crate) fn restart(&mut self, key: ClipKey, clips: &ClipLibrary) {
        *self = Self::new(key, clips);
    }
}
