//! Falling meteors and the explosions they leave behind.

use robot_run_core::{ClipKey, ClipLibrary, MeteorId, Rect};

use crate::animation::Animation;

/// Cosmetically spinning projectile that falls straight down.
#[derive(Clone, Debug)]
pub struct Meteor {
    id: MeteorId,
    center_x: f32,
    top: f32,
    rotation: f32,
    rotation_speed: f32,
    animation: Animation,
    grayscale: bool,
}

impl Meteor {
    /// Creates a meteor whose sprite sits just above the top of the screen.
    pub(crate) fn new(
        id: MeteorId,
        center_x: f32,
        rotation_speed: f32,
        clips: &ClipLibrary,
    ) -> Self {
        let animation = Animation::new(ClipKey::Meteor, clips);
        Self {
            id,
            center_x,
            top: -animation.frame_height(),
            rotation: 0.0,
            rotation_speed,
            animation,
            grayscale: false,
        }
    }

    /// Identifier of the meteor.
    #[must_use]
    pub const fn id(&self) -> MeteorId {
        self.id
    }

    /// Animation being played.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Spin angle in degrees within `0.0..360.0`.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Spin rate in degrees per second.
    #[must_use]
    pub const fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    /// Visual and collision rectangle of the meteor.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let width = self.animation.frame_width();
        let height = self.animation.frame_height();
        Rect::new(self.center_x - width * 0.5, self.top, width, height)
    }

    /// Whether the meteor should be drawn without colour.
    #[must_use]
    pub const fn grayscale(&self) -> bool {
        self.grayscale
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    pub(crate) fn update(&mut self, dt: f32, fall_speed: f32) {
        self.top += fall_speed * dt;
        self.rotation = (self.rotation + self.rotation_speed * dt).rem_euclid(360.0);
        self.animation.advance(dt);
    }
}

/// Short-lived blast spawned by a meteor impact.
#[derive(Clone, Debug)]
pub struct Explosion {
    center_x: f32,
    center_y: f32,
    time_to_live: f32,
    animation: Animation,
    grayscale: bool,
}

impl Explosion {
    pub(crate) fn new(center_x: f32, center_y: f32, clips: &ClipLibrary) -> Self {
        let animation = Animation::new(ClipKey::Explosion, clips);
        Self {
            center_x,
            center_y,
            time_to_live: animation.duration(),
            animation,
            grayscale: false,
        }
    }

    /// Animation being played.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Visual rectangle centred on the impact point.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let width = self.animation.frame_width();
        let height = self.animation.frame_height();
        Rect::new(
            self.center_x - width * 0.5,
            self.center_y - height * 0.5,
            width,
            height,
        )
    }

    /// Seconds left before the explosion is removed.
    #[must_use]
    pub const fn time_to_live(&self) -> f32 {
        self.time_to_live
    }

    /// Whether the explosion has played out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.time_to_live <= 0.0
    }

    /// Whether the explosion should be drawn without colour.
    #[must_use]
    pub const fn grayscale(&self) -> bool {
        self.grayscale
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.time_to_live -= dt;
        self.animation.advance(dt);
    }
}
