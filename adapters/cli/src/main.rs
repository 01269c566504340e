#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Robot Run experience.

mod config;
mod scene;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_run_core::{Event, InputSnapshot, LevelLayout, Tuning};
use robot_run_level::{builtin_scenes, floor_layout, load_scenes};
use robot_run_rendering::{Color, Presentation, RenderingBackend, Scene};
use robot_run_rendering_macroquad::MacroquadBackend;
use robot_run_system_session::{Config as SessionConfig, Session};
use robot_run_world::query;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const HEADLESS_FRAME: Duration = Duration::from_micros(16_667);

/// Command-line arguments for the Robot Run binary.
#[derive(Debug, Parser)]
#[command(name = "robot-run", about = "Side-scrolling robot platformer")]
struct Args {
    /// TOML file overriding tuning, meteor, window and clip settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory holding `level0.txt`, `level1.txt`, ... played in order.
    #[arg(long, value_name = "DIR", conflicts_with = "random_floor")]
    levels: Option<PathBuf>,
    /// Seed for crawler decisions, meteors and debug spawns.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulate this many frames without opening a window, then exit.
    #[arg(long, value_name = "FRAMES")]
    headless_frames: Option<u32>,
    /// Play a single scene made of a randomly textured floor.
    #[arg(long)]
    random_floor: bool,
}

/// Entry point for the Robot Run command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.tuning.seed = seed;
    }

    let scenes = select_scenes(&args, &config.tuning)?;
    let mut session = Session::new(SessionConfig::new(
        config.tuning.clone(),
        config.clip_library(),
        config.meteor_shower.to_config(&config.tuning),
    ));
    let mut events = Vec::new();
    session.start(scenes, &mut events);
    log_events(&events);
    println!("{}", query::welcome_banner(session.world()));

    match args.headless_frames {
        Some(frames) => {
            run_headless(&mut session, frames);
            Ok(())
        }
        None => run_windowed(session, &config),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn select_scenes(args: &Args, tuning: &Tuning) -> Result<Vec<LevelLayout>> {
    if args.random_floor {
        let mut rng = ChaCha8Rng::seed_from_u64(tuning.seed);
        let columns = grid_cells(tuning.screen_width, tuning.tile_width);
        let rows = grid_cells(tuning.screen_height, tuning.tile_height);
        return Ok(vec![floor_layout(columns, rows, &mut rng)]);
    }
    if let Some(dir) = &args.levels {
        return load_scenes(dir)
            .with_context(|| format!("failed to load levels from {}", dir.display()));
    }
    builtin_scenes().context("bundled levels are invalid")
}

fn grid_cells(extent: f32, cell: f32) -> u32 {
    if cell > 0.0 {
        (extent / cell).floor().clamp(1.0, 4096.0) as u32
    } else {
        1
    }
}

fn run_headless(session: &mut Session, frames: u32) {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.clear();
        session.frame(HEADLESS_FRAME, InputSnapshot::new(), &mut events);
        log_events(&events);
    }

    let world = session.world();
    let scene = query::scene(world).map_or(0, |scene| scene.get());
    info!(
        frames,
        scene,
        score = query::score(world),
        lives = query::lives(world),
        crawlers = query::crawlers(world).len(),
        "headless run finished"
    );
    println!(
        "frames={frames} scene={scene} score={} lives={}",
        query::score(world),
        query::lives(world)
    );
}

fn run_windowed(mut session: Session, config: &config::GameConfig) -> Result<()> {
    let scene = Scene::new(config.tuning.screen_width, config.tuning.screen_height)?;
    let presentation = Presentation::new("Robot Run", Color::from_rgb_u8(92, 148, 252), scene);
    let mut events = Vec::new();

    MacroquadBackend::new()
        .with_settings(config.window)
        .run(presentation, move |dt, input, scene| {
            events.clear();
            session.frame(dt, input, &mut events);
            log_events(&events);
            scene::compose(&session, scene);
        })
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::SoundTriggered { cue } => debug!(?cue, "play sound"),
            Event::MusicChanged { cue } => info!(?cue, "music"),
            Event::GameOver => info!("game over"),
            Event::GoalReached => info!("goal reached"),
            Event::SceneLoaded { scene, .. } => info!(scene = scene.get(), "scene loaded"),
            other => debug!(?other, "world event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse_with_defaults() {
        let args = Args::try_parse_from(["robot-run"]).expect("no arguments are valid");

        assert!(args.config.is_none());
        assert!(args.headless_frames.is_none());
        assert!(!args.random_floor);
    }

    #[test]
    fn levels_and_random_floor_conflict() {
        let result =
            Args::try_parse_from(["robot-run", "--levels", "scenes", "--random-floor"]);

        assert!(result.is_err());
    }

    #[test]
    fn random_floor_fills_the_screen() {
        let args = Args::try_parse_from(["robot-run", "--random-floor"]).expect("valid flags");
        let tuning = Tuning::default();

        let scenes = select_scenes(&args, &tuning).expect("floor layout never fails");

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].columns(), 20);
        assert_eq!(scenes[0].rows(), 15);
    }

    #[test]
    fn degenerate_tile_sizes_still_produce_a_grid() {
        assert_eq!(grid_cells(640.0, 0.0), 1);
        assert_eq!(grid_cells(10.0, 32.0), 1);
        assert_eq!(grid_cells(640.0, 32.0), 20);
    }
}
