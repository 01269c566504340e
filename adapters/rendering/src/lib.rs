#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Robot Run adapters.
//!
//! A [`Scene`] is a flat, backend-agnostic description of one frame: sprites
//! in draw order, optional debug rectangles and the HUD counters. Backends
//! never see simulation types beyond the identifiers re-exported by core.

use anyhow::Result as AnyResult;
use glam::Vec2;
use robot_run_core::{ClipKey, CrawlerKind, InputSnapshot, Rect, TileSet};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the color with its hue removed, keeping perceived brightness.
    #[must_use]
    pub fn grayscale(self) -> Self {
        let luma = 0.299 * self.red + 0.587 * self.green + 0.114 * self.blue;
        Self {
            red: luma,
            green: luma,
            blue: luma,
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// What a sprite depicts; backends pick textures or fallback colors from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    /// Solid level tile.
    Tile(TileSet),
    /// The player robot.
    Robot,
    /// A crawler of the given kind.
    Crawler(CrawlerKind),
    /// A collectible coin.
    Coin,
    /// A falling meteor.
    Meteor,
    /// A meteor explosion.
    Explosion,
}

/// Single textured quad to draw, in scene pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Depicted entity.
    pub kind: SpriteKind,
    /// Animation clip, if the sprite is animated.
    pub clip: Option<ClipKey>,
    /// Frame within the clip.
    pub frame: u32,
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Mirror horizontally; sprites face right by default.
    pub flip_x: bool,
    /// Clockwise rotation about the sprite centre, in degrees.
    pub rotation_degrees: f32,
    /// Draw without colour.
    pub grayscale: bool,
    /// The clip was missing and a placeholder stands in for it.
    pub placeholder: bool,
}

impl Sprite {
    /// Creates an unrotated, unflipped sprite covering `rect`.
    #[must_use]
    pub fn new(kind: SpriteKind, rect: Rect) -> Self {
        Self {
            kind,
            clip: None,
            frame: 0,
            position: Vec2::new(rect.x, rect.y),
            size: Vec2::new(rect.w, rect.h),
            flip_x: false,
            rotation_degrees: 0.0,
            grayscale: false,
            placeholder: false,
        }
    }

    /// Attaches an animation frame.
    #[must_use]
    pub fn with_frame(mut self, clip: ClipKey, frame: u32, placeholder: bool) -> Self {
        self.clip = Some(clip);
        self.frame = frame;
        self.placeholder = placeholder;
        self
    }

    /// Sets horizontal mirroring.
    #[must_use]
    pub fn with_flip(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    /// Sets the rotation about the sprite centre.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Sets grayscale drawing.
    #[must_use]
    pub fn with_grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }

    /// Centre of the sprite.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Purpose of a debug rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugRectRole {
    /// Gameplay collision rectangle.
    Collision,
    /// Tile cell probed for ground, ceiling or ledges.
    Probe,
}

/// Outline drawn when collision overlays are enabled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugRect {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// What the rectangle represents.
    pub role: DebugRectRole,
}

impl DebugRect {
    /// Creates a debug outline covering `rect`.
    #[must_use]
    pub fn new(rect: Rect, role: DebugRectRole) -> Self {
        Self {
            position: Vec2::new(rect.x, rect.y),
            size: Vec2::new(rect.w, rect.h),
            role,
        }
    }
}

/// Counters shown on top of the play field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hud {
    /// Current score.
    pub score: u32,
    /// Lives left.
    pub lives: u32,
    /// Zero-based scene index.
    pub scene: u32,
}

/// Overall state of the session, used for overlay text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Banner {
    /// Normal play; no overlay.
    #[default]
    None,
    /// The stopwatch is paused.
    Paused,
    /// The robot ran out of lives.
    GameOver,
    /// The robot passed the flagpole.
    Victory,
}

/// Scene description of a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Width of the play field in scene pixels.
    pub width: f32,
    /// Height of the play field in scene pixels.
    pub height: f32,
    /// Sprites in back-to-front order.
    pub sprites: Vec<Sprite>,
    /// Collision overlays; empty unless enabled.
    pub debug_rects: Vec<DebugRect>,
    /// Score, lives and scene counters.
    pub hud: Hud,
    /// Overlay message.
    pub banner: Banner,
}

impl Scene {
    /// Creates an empty scene of the given size.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RenderingError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            sprites: Vec::new(),
            debug_rects: Vec::new(),
            hud: Hud::default(),
            banner: Banner::None,
        })
    }

    /// Removes all sprites and overlays while keeping allocations.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.debug_rects.clear();
        self.banner = Banner::None;
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Robot Run scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the wall-clock frame
    /// delta and the actions held this frame, and refreshes the scene before
    /// it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, InputSnapshot, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Scenes must have a positive, finite size.
    InvalidDimensions {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "scene size must be positive (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_creation_rejects_degenerate_sizes_without_panicking() {
        for (width, height) in [(0.0, 480.0), (640.0, -1.0), (f32::NAN, 480.0)] {
            let error = Scene::new(width, height).expect_err("degenerate size must be rejected");
            assert!(matches!(error, RenderingError::InvalidDimensions { .. }));
        }
        assert!(Scene::new(640.0, 480.0).is_ok());
    }

    #[test]
    fn clearing_keeps_the_hud() {
        let mut scene = Scene::new(640.0, 480.0).expect("valid size");
        scene.hud = Hud {
            score: 10,
            lives: 3,
            scene: 1,
        };
        scene.banner = Banner::Paused;
        scene
            .sprites
            .push(Sprite::new(SpriteKind::Coin, Rect::new(0.0, 0.0, 32.0, 32.0)));

        scene.clear();

        assert!(scene.sprites.is_empty());
        assert_eq!(scene.banner, Banner::None);
        assert_eq!(scene.hud.lives, 3);
    }

    #[test]
    fn grayscale_keeps_alpha_and_equalises_channels() {
        let gray = Color::new(1.0, 0.5, 0.0, 0.25).grayscale();

        assert_eq!(gray.red, gray.green);
        assert_eq!(gray.green, gray.blue);
        assert_eq!(gray.alpha, 0.25);
    }

    #[test]
    fn sprite_centre_accounts_for_size() {
        let sprite = Sprite::new(SpriteKind::Meteor, Rect::new(10.0, 20.0, 48.0, 48.0))
            .with_rotation(90.0);

        assert_eq!(sprite.center(), Vec2::new(34.0, 44.0));
        assert_eq!(sprite.rotation_degrees, 90.0);
    }
}
