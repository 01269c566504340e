use robot_run_core::{ClipKey, ClipLibrary, CoinId, Rect};

use crate::animation::Animation;

/// Collectible coin placed by a level layout.
#[derive(Clone, Debug)]
pub struct Coin {
    id: CoinId,
    center_x: f32,
    center_y: f32,
    animation: Animation,
    pickup_frames: u32,
    grayscale: bool,
}

impl Coin {
    pub(crate) fn new(id: CoinId, center_x: f32, center_y: f32, clips: &ClipLibrary) -> Self {
        Self {
            id,
            center_x,
            center_y,
            animation: Animation::new(ClipKey::Coin, clips),
            pickup_frames: 0,
            grayscale: false,
        }
    }

    /// Identifier of the coin.
    #[must_use]
    pub const fn id(&self) -> CoinId {
        self.id
    }

    /// Animation being played.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Visual and collision rectangle of the coin.
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

    /// Whether the robot has already picked the coin up.
    #[must_use]
    pub const fn is_collected(&self) -> bool {
        self.pickup_frames > 0
    }

    /// Frames counted since pickup; zero until collected.
    #[must_use]
    pub const fn pickup_frames(&self) -> u32 {
        self.pickup_frames
    }

    /// Whether the coin should be drawn without colour.
    #[must_use]
    pub const fn grayscale(&self) -> bool {
        self.grayscale
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.animation.advance(dt);
    }

    /// Starts or continues the post-pickup countdown.
    pub(crate) fn count_pickup_frame(&mut self) {
        self.pickup_frames = self.pickup_frames.saturating_add(1);
    }
}
