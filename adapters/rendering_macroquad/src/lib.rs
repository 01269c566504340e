#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Robot Run.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature, so sound and music cues are only logged.
//!
//! Sprites are drawn as flat placeholder shapes coloured by what they depict.

use std::time::Duration;

use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::BLACK,
    input::{is_key_down, is_key_pressed, KeyCode},
};
use robot_run_core::{Action, CrawlerKind, InputSnapshot, TileSet};
use robot_run_rendering::{
    Banner, Color, DebugRectRole, Presentation, RenderingBackend, Scene, Sprite, SpriteKind,
};
use serde::Deserialize;
use tracing::info;

/// Keys mapped onto logical actions; several keys may share an action.
pub const KEY_BINDINGS: [(KeyCode, Action); 13] = [
    (KeyCode::Left, Action::Left),
    (KeyCode::A, Action::Left),
    (KeyCode::Right, Action::Right),
    (KeyCode::D, Action::Right),
    (KeyCode::Space, Action::Jump),
    (KeyCode::Up, Action::Jump),
    (KeyCode::W, Action::Jump),
    (KeyCode::R, Action::Resurrect),
    (KeyCode::P, Action::Pause),
    (KeyCode::V, Action::ToggleDebugRects),
    (KeyCode::Key9, Action::ToggleMusic),
    (KeyCode::C, Action::SpawnWeakCrawler),
    (KeyCode::S, Action::SpawnStrongCrawler),
];

const HUD_FONT_SIZE: f32 = 24.0;
const BANNER_FONT_SIZE: f32 = 48.0;

/// Builds the held-action snapshot from a key state lookup.
#[must_use]
pub fn actions_from_keys<F>(is_down: F) -> InputSnapshot
where
    F: Fn(KeyCode) -> bool,
{
    KEY_BINDINGS
        .iter()
        .filter(|(key, _)| is_down(*key))
        .map(|(_, action)| *action)
        .collect()
}

/// Window options read from the `[window]` configuration table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window pixels per scene pixel.
    pub scale: f32,
    /// Synchronise presentation with the display refresh rate.
    pub vsync: bool,
    /// Log frames-per-second once per second.
    pub show_fps: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            vsync: true,
            show_fps: false,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    settings: WindowSettings,
}

impl MacroquadBackend {
    /// Returns a backend using default window settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the window settings.
    #[must_use]
    pub fn with_settings(mut self, settings: WindowSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Counts rendered frames and reports the rate once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, InputSnapshot, &mut Scene) + 'static,
    {
        let WindowSettings {
            scale,
            vsync,
            show_fps,
        } = self.settings;
        let scale = if scale > 0.0 { scale } else { 1.0 };

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: (scene.width * scale).round() as i32,
            window_height: (scene.height * scale).round() as i32,
            ..macroquad::window::Conf::default()
        };
        config.platform.swap_interval = Some(i32::from(vsync));

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    info!("quit requested");
                    break;
                }

                let input = actions_from_keys(is_key_down);
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, input, &mut scene);

                macroquad::window::clear_background(background);
                let viewport = Viewport::fit(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                for sprite in &scene.sprites {
                    draw_sprite(sprite, &viewport);
                }
                draw_debug_rects(&scene, &viewport);
                draw_hud(&scene, &viewport);
                draw_banner(&scene, &viewport);

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!(fps = per_second, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping scene pixels onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    scale: f32,
    offset: Vec2,
}

impl Viewport {
    fn fit(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let scale = (screen_width / scene.width)
            .min(screen_height / scene.height)
            .max(f32::EPSILON);
        let used = Vec2::new(scene.width, scene.height) * scale;
        let offset = (Vec2::new(screen_width, screen_height) - used) * 0.5;
        Self {
            scale,
            offset: offset.max(Vec2::ZERO),
        }
    }

    fn point(&self, scene_point: Vec2) -> Vec2 {
        self.offset + scene_point * self.scale
    }

    fn length(&self, scene_length: f32) -> f32 {
        scene_length * self.scale
    }
}

fn sprite_color(sprite: &Sprite) -> Color {
    let base = if sprite.placeholder {
        Color::from_rgb_u8(0xff, 0x00, 0xff)
    } else {
        match sprite.kind {
            SpriteKind::Tile(TileSet::Primary) => Color::from_rgb_u8(0x6b, 0x4f, 0x2d),
            SpriteKind::Tile(TileSet::Secondary) => Color::from_rgb_u8(0x6b, 0x4f, 0x2d).lighten(0.3),
            SpriteKind::Robot => Color::from_rgb_u8(0x4a, 0x90, 0xd9),
            SpriteKind::Crawler(CrawlerKind::Weak) => Color::from_rgb_u8(0x5c, 0xb8, 0x5c),
            SpriteKind::Crawler(CrawlerKind::Strong) => Color::from_rgb_u8(0xb0, 0x3a, 0x2e),
            SpriteKind::Coin => Color::from_rgb_u8(0xff, 0xd7, 0x00),
            SpriteKind::Meteor => Color::from_rgb_u8(0x8b, 0x5a, 0x2b),
            SpriteKind::Explosion => Color::new(1.0, 0.55, 0.1, 0.8),
        }
    };
    if sprite.grayscale {
        base.grayscale()
    } else {
        base
    }
}

fn draw_sprite(sprite: &Sprite, viewport: &Viewport) {
    let color = to_macroquad_color(sprite_color(sprite));
    let top_left = viewport.point(sprite.position);
    let size = sprite.size * viewport.scale;
    let center = viewport.point(sprite.center());

    match sprite.kind {
        SpriteKind::Meteor => macroquad::shapes::draw_poly(
            center.x,
            center.y,
            6,
            size.x.min(size.y) * 0.5,
            sprite.rotation_degrees,
            color,
        ),
        SpriteKind::Explosion => {
            macroquad::shapes::draw_circle(center.x, center.y, size.x.min(size.y) * 0.5, color);
        }
        SpriteKind::Coin => {
            let spin = (sprite.frame as f32 * std::f32::consts::FRAC_PI_4).cos().abs();
            let width = size.x * (0.25 + 0.75 * spin);
            macroquad::shapes::draw_rectangle(
                center.x - width * 0.5,
                top_left.y,
                width,
                size.y,
                color,
            );
        }
        SpriteKind::Robot | SpriteKind::Crawler(_) => {
            macroquad::shapes::draw_rectangle(top_left.x, top_left.y, size.x, size.y, color);
            let eye = size.x.min(size.y) * 0.15;
            let eye_x = if sprite.flip_x {
                top_left.x + eye
            } else {
                top_left.x + size.x - eye * 2.0
            };
            macroquad::shapes::draw_rectangle(eye_x, top_left.y + eye, eye, eye, BLACK);
        }
        SpriteKind::Tile(_) => {
            macroquad::shapes::draw_rectangle(top_left.x, top_left.y, size.x, size.y, color);
            macroquad::shapes::draw_rectangle_lines(
                top_left.x,
                top_left.y,
                size.x,
                size.y,
                1.0,
                BLACK,
            );
        }
    }
}

fn draw_debug_rects(scene: &Scene, viewport: &Viewport) {
    for rect in &scene.debug_rects {
        let color = match rect.role {
            DebugRectRole::Collision => Color::from_rgb_u8(0xff, 0x00, 0x00),
            DebugRectRole::Probe => Color::from_rgb_u8(0x00, 0xff, 0xff),
        };
        let top_left = viewport.point(rect.position);
        let size = rect.size * viewport.scale;
        macroquad::shapes::draw_rectangle_lines(
            top_left.x,
            top_left.y,
            size.x,
            size.y,
            2.0,
            to_macroquad_color(color),
        );
    }
}

fn draw_hud(scene: &Scene, viewport: &Viewport) {
    let hud = scene.hud;
    let text = format!(
        "Score {}   Lives {}   Scene {}",
        hud.score,
        hud.lives,
        hud.scene + 1
    );
    let origin = viewport.point(Vec2::new(8.0, HUD_FONT_SIZE));
    let _ = macroquad::text::draw_text(
        &text,
        origin.x,
        origin.y,
        viewport.length(HUD_FONT_SIZE),
        macroquad::color::WHITE,
    );
}

fn draw_banner(scene: &Scene, viewport: &Viewport) {
    let text = match scene.banner {
        Banner::None => return,
        Banner::Paused => "PAUSED",
        Banner::GameOver => "GAME OVER",
        Banner::Victory => "YOU MADE IT",
    };
    let font_size = viewport.length(BANNER_FONT_SIZE);
    let dimensions = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
    let center = viewport.point(Vec2::new(scene.width * 0.5, scene.height * 0.5));
    let _ = macroquad::text::draw_text(
        text,
        center.x - dimensions.width * 0.5,
        center.y,
        font_size,
        macroquad::color::WHITE,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(640.0, 480.0).expect("valid size")
    }

    #[test]
    fn viewport_letterboxes_wide_windows() {
        let viewport = Viewport::fit(&scene(), 1920.0, 960.0);

        assert_eq!(viewport.scale, 2.0);
        assert_eq!(viewport.offset, Vec2::new(320.0, 0.0));
        assert_eq!(
            viewport.point(Vec2::new(640.0, 480.0)),
            Vec2::new(1600.0, 960.0)
        );
    }

    #[test]
    fn viewport_shrinks_into_small_windows() {
        let viewport = Viewport::fit(&scene(), 320.0, 480.0);

        assert_eq!(viewport.scale, 0.5);
        assert_eq!(viewport.offset, Vec2::new(0.0, 120.0));
        assert_eq!(viewport.length(24.0), 12.0);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let mut reports = Vec::new();
        for _ in 0..120 {
            if let Some(rate) = counter.record_frame(Duration::from_millis(20)) {
                reports.push(rate);
            }
        }

        assert_eq!(reports.len(), 2);
        assert!((reports[0] - 50.0).abs() < 0.01);
    }

    #[test]
    fn grayscale_sprites_lose_their_hue() {
        let sprite = Sprite::new(
            SpriteKind::Coin,
            robot_run_core::Rect::new(0.0, 0.0, 32.0, 32.0),
        )
        .with_grayscale(true);
        let color = sprite_color(&sprite);

        assert_eq!(color.red, color.green);
        assert_eq!(color.green, color.blue);
    }

    #[test]
    fn window_settings_fill_missing_keys() {
        let settings: WindowSettings = toml::from_str("scale = 2.0").expect("valid window table");

        assert_eq!(settings.scale, 2.0);
        assert!(settings.vsync);
        assert!(!settings.show_fps);
    }
}
