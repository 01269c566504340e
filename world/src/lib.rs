#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Robot Run.
//!
//! The world owns the active scene's tile grid and every entity living in it.
//! Each [`Command::Tick`] runs one coordinator pass in a fixed order: the
//! robot moves first, then coins, crawlers, explosions and meteors are swept,
//! and finally the robot's invulnerability flash is advanced. Every entity is
//! advanced exactly once per pass and removals are compacted with
//! [`Vec::retain`], so no sweep is ever left half applied.

mod animation;
mod coin;
mod crawler;
mod grid;
mod meteor;
mod robot;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_run_core::{
    ClipLibrary, CoinId, Command, CrawlerId, CrawlerKind, CrawlerState, Event, Facing,
    InputSnapshot, LevelLayout, MeteorId, MusicCue, SceneIndex, SoundCue, SpawnKind, Track,
    Tuning, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

pub use animation::Animation;
pub use coin::Coin;
pub use crawler::Crawler;
pub use grid::{TileGrid, TileQuery};
pub use meteor::{Explosion, Meteor};
pub use robot::{Robot, RobotState};

use crawler::Thinking;
use robot::{RobotOutcome, Surroundings};

/// Mixed into the tuning seed so the world's stream differs from the systems'.
const WORLD_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Running score and the threshold for the next extra life.
#[derive(Clone, Debug)]
struct Scoreboard {
    score: u32,
    next_extra_life: u32,
}

impl Scoreboard {
    fn new(extra_life_every: u32) -> Self {
        Self {
            score: 0,
            next_extra_life: extra_life_every,
        }
    }

    /// Adds `points`, awarding a life for every threshold crossed.
    fn award(
        &mut self,
        points: u32,
        extra_life_every: u32,
        robot: &mut Robot,
        out: &mut Vec<Event>,
    ) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        out.push(Event::ScoreChanged { score: self.score });

        while extra_life_every > 0 && self.score >= self.next_extra_life {
            self.next_extra_life = self.next_extra_life.saturating_add(extra_life_every);
            let lives = robot.gain_life();
            out.push(Event::SoundTriggered {
                cue: SoundCue::LifeGain,
            });
            out.push(Event::LifeGained { lives });
            if self.next_extra_life == u32::MAX {
                break;
            }
        }
    }
}

/// Represents the authoritative Robot Run world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: Tuning,
    clips: ClipLibrary,
    scenes: Vec<LevelLayout>,
    scene: Option<SceneIndex>,
    grid: TileGrid,
    robot: Robot,
    crawlers: Vec<Crawler>,
    coins: Vec<Coin>,
    meteors: Vec<Meteor>,
    explosions: Vec<Explosion>,
    scoreboard: Scoreboard,
    clock: f32,
    rng: ChaCha8Rng,
    next_crawler: u32,
    next_coin: u32,
    next_meteor: u32,
    game_over: bool,
    goal_reached: bool,
}

impl World {
    /// Creates a world with no scenes configured.
    ///
    /// Missing animation clips are reported once here and replaced by
    /// placeholders for the rest of the session.
    #[must_use]
    pub fn new(tuning: Tuning, clips: ClipLibrary) -> Self {
        for key in clips.missing_keys() {
            warn!(clip = key.name(), "animation clip missing, using placeholder");
        }

        let robot = Robot::new(&tuning, &clips);
        Self {
            banner: WELCOME_BANNER,
            grid: TileGrid::unset(tuning.tile_width, tuning.tile_height),
            rng: ChaCha8Rng::seed_from_u64(tuning.seed ^ WORLD_STREAM),
            scoreboard: Scoreboard::new(tuning.extra_life_every),
            robot,
            tuning,
            clips,
            scenes: Vec::new(),
            scene: None,
            crawlers: Vec::new(),
            coins: Vec::new(),
            meteors: Vec::new(),
            explosions: Vec::new(),
            clock: 0.0,
            next_crawler: 0,
            next_coin: 0,
            next_meteor: 0,
            game_over: false,
            goal_reached: false,
        }
    }

    fn is_final_scene(&self, scene: SceneIndex) -> bool {
        scene.get() as usize + 1 >= self.scenes.len()
    }

    fn load_scene(&mut self, scene: SceneIndex, spawn_items: bool, out: &mut Vec<Event>) {
        let Some(layout) = self.scenes.get(scene.get() as usize) else {
            warn!(scene = scene.get(), "ignoring request for unknown scene");
            return;
        };

        self.grid =
            TileGrid::from_layout(layout, self.tuning.tile_width, self.tuning.tile_height);
        self.grid.set_grayscale(self.game_over);
        self.crawlers.clear();
        self.coins.clear();
        self.meteors.clear();
        self.explosions.clear();
        self.scene = Some(scene);

        if spawn_items {
            let spawns = layout.spawns().to_vec();
            for spawn in spawns {
                let column = spawn.column as f32;
                let row = spawn.row as f32;
                match spawn.kind {
                    SpawnKind::Crawler(kind) => self.spawn_crawler(
                        kind,
                        column * self.tuning.tile_width,
                        (row + 1.0) * self.tuning.tile_height,
                        Facing::Left,
                        out,
                    ),
                    SpawnKind::Coin => self.spawn_coin(
                        (column + 0.5) * self.tuning.tile_width,
                        (row + 0.5) * self.tuning.tile_height,
                    ),
                }
            }
        }

        self.robot.refresh(&self.grid);
        info!(
            scene = scene.get(),
            spawn_items,
            crawlers = self.crawlers.len(),
            coins = self.coins.len(),
            "scene loaded"
        );
        out.push(Event::SceneLoaded { scene, spawn_items });
    }

    fn spawn_crawler(
        &mut self,
        kind: CrawlerKind,
        x: f32,
        bottom: f32,
        facing: Facing,
        out: &mut Vec<Event>,
    ) {
        let id = CrawlerId::new(self.next_crawler);
        self.next_crawler = self.next_crawler.wrapping_add(1);
        let thinking = Thinking {
            clips: &self.clips,
            now: self.clock,
            rng: &mut self.rng,
        };
        let mut crawler = Crawler::spawn(id, kind, x, bottom, facing, thinking);
        crawler.set_grayscale(self.game_over);
        debug!(crawler = id.get(), ?kind, x, bottom, "crawler spawned");
        self.crawlers.push(crawler);
        out.push(Event::CrawlerSpawned { crawler: id, kind });
    }

    fn spawn_coin(&mut self, center_x: f32, center_y: f32) {
        let id = CoinId::new(self.next_coin);
        self.next_coin = self.next_coin.wrapping_add(1);
        let mut coin = Coin::new(id, center_x, center_y, &self.clips);
        coin.set_grayscale(self.game_over);
        self.coins.push(coin);
    }

    fn spawn_meteor(&mut self, center_x: f32, rotation_speed: f32, out: &mut Vec<Event>) {
        let id = MeteorId::new(self.next_meteor);
        self.next_meteor = self.next_meteor.wrapping_add(1);
        let mut meteor = Meteor::new(id, center_x, rotation_speed, &self.clips);
        meteor.set_grayscale(self.game_over);
        debug!(meteor = id.get(), center_x, rotation_speed, "meteor spawned");
        self.meteors.push(meteor);
        out.push(Event::MeteorSpawned { meteor: id });
    }

    fn step(&mut self, dt: f32, input: InputSnapshot, out: &mut Vec<Event>) {
        let Some(scene) = self.scene else {
            return;
        };

        self.update_robot(scene, dt, input, out);
        self.sweep_coins(dt, out);
        let game_over = self.sweep_crawlers(dt, out);
        self.sweep_explosions(dt);
        let game_over = self.sweep_meteors(dt, out) || game_over;
        if game_over {
            self.enter_game_over(out);
        }
        self.robot.tick_flash(dt);
    }

    fn update_robot(
        &mut self,
        scene: SceneIndex,
        dt: f32,
        input: InputSnapshot,
        out: &mut Vec<Event>,
    ) {
        let env = Surroundings {
            grid: &self.grid,
            tuning: &self.tuning,
            clips: &self.clips,
            first_scene: scene.get() == 0,
            final_scene: self.is_final_scene(scene),
        };

        match self.robot.update(dt, input, &env, out) {
            RobotOutcome::Stay => {}
            RobotOutcome::AdvanceScene => self.load_scene(scene.next(), true, out),
            RobotOutcome::RetreatScene => {
                if let Some(previous) = scene.previous() {
                    self.load_scene(previous, false, out);
                }
            }
            RobotOutcome::Resurrected => {
                info!(lives = self.robot.lives(), "robot resurrected");
                out.push(Event::RobotResurrected);
                self.load_scene(SceneIndex::new(0), true, out);
                out.push(Event::MusicChanged {
                    cue: MusicCue::Play(Track::Main),
                });
            }
            RobotOutcome::GoalReached => {
                info!("goal reached");
                self.goal_reached = true;
                out.push(Event::GoalReached);
                out.push(Event::MusicChanged {
                    cue: MusicCue::Play(Track::Victory),
                });
            }
        }

        if let Some(scene) = self.scene {
            if self.is_final_scene(scene) && self.robot.engage_autopilot() {
                debug!(scene = scene.get(), "auto-pilot engaged");
            }
        }
    }

    fn sweep_coins(&mut self, dt: f32, out: &mut Vec<Event>) {
        let Self {
            coins,
            robot,
            scoreboard,
            tuning,
            ..
        } = self;
        let pickup_frames = tuning.coin_pickup_frames.max(1);

        for coin in coins.iter_mut() {
            coin.advance(dt);
            if coin.is_collected() {
                coin.count_pickup_frame();
                continue;
            }
            if robot.is_dead() || !robot.collision_rect().overlaps(&coin.rect()) {
                continue;
            }
            coin.count_pickup_frame();
            out.push(Event::SoundTriggered {
                cue: SoundCue::Coin,
            });
            out.push(Event::CoinCollected { coin: coin.id() });
            scoreboard.award(tuning.coin_points, tuning.extra_life_every, robot, out);
        }

        coins.retain(|coin| {
            let expired = coin.pickup_frames() >= pickup_frames;
            if expired {
                out.push(Event::CoinRemoved { coin: coin.id() });
            }
            !expired
        });
    }

    /// Resolves robot and crawler contact, then advances every crawler.
    ///
    /// Returns whether the robot ran out of lives during the sweep.
    fn sweep_crawlers(&mut self, dt: f32, out: &mut Vec<Event>) -> bool {
        let Self {
            crawlers,
            robot,
            scoreboard,
            tuning,
            clips,
            grid,
            rng,
            clock,
            ..
        } = self;

        crawlers.retain(|crawler| {
            let dead = crawler.state() == CrawlerState::Dead;
            if dead {
                debug!(crawler = crawler.id().get(), "crawler removed");
                out.push(Event::CrawlerRemoved {
                    crawler: crawler.id(),
                });
            }
            !dead
        });

        let mut game_over = false;
        for crawler in crawlers.iter_mut() {
            let target = crawler.collision_rect();
            let body = robot.collision_rect();
            let dying = matches!(crawler.state(), CrawlerState::Dying | CrawlerState::Dead);
            let stomped = robot.stomp_ready()
                && !robot.is_dead()
                && !dying
                && body.overlaps_horizontally(&target)
                && robot.previous_bottom() <= target.top()
                && body.bottom() > target.top();

            if stomped {
                let killed = crawler.jumped_on();
                out.push(Event::SoundTriggered {
                    cue: if killed {
                        SoundCue::StompKill
                    } else {
                        SoundCue::StompNoKill
                    },
                });
                crawler.set_state(
                    CrawlerState::Dying,
                    Thinking {
                        clips,
                        now: *clock,
                        rng: &mut *rng,
                    },
                );
                robot.bounce_off(target.top(), -tuning.stomp_bounce, clips);
                out.push(Event::CrawlerStomped {
                    crawler: crawler.id(),
                    killed,
                });
                scoreboard.award(tuning.stomp_points, tuning.extra_life_every, robot, out);
            } else if !dying && robot.is_vulnerable() && body.overlaps(&target) {
                game_over |= kill_robot(robot, tuning, clips, out);
            }

            crawler.update(
                dt,
                grid,
                tuning,
                Thinking {
                    clips,
                    now: *clock,
                    rng: &mut *rng,
                },
            );
        }
        game_over
    }

    fn sweep_explosions(&mut self, dt: f32) {
        self.explosions.retain_mut(|explosion| {
            explosion.update(dt);
            !explosion.is_finished()
        });
    }

    /// Advances meteors and resolves robot and ground impacts.
    ///
    /// Returns whether the robot ran out of lives during the sweep.
    fn sweep_meteors(&mut self, dt: f32, out: &mut Vec<Event>) -> bool {
        let Self {
            meteors,
            explosions,
            robot,
            tuning,
            clips,
            grid,
            game_over: grayscale,
            ..
        } = self;

        let mut game_over = false;
        meteors.retain_mut(|meteor| {
            meteor.update(dt, tuning.meteor_speed);
            let rect = meteor.rect();

            let hit_robot = robot.is_vulnerable() && rect.overlaps(&robot.collision_rect());
            let hit_ground = !hit_robot && grid.is_floor_at(rect.center_x(), rect.bottom());
            if !hit_robot && !hit_ground {
                return true;
            }

            if hit_robot {
                game_over |= kill_robot(robot, tuning, clips, out);
            } else {
                out.push(Event::SoundTriggered {
                    cue: SoundCue::Thud,
                });
            }
            let mut explosion = Explosion::new(rect.center_x(), rect.center_y(), clips);
            explosion.set_grayscale(*grayscale);
            explosions.push(explosion);
            debug!(meteor = meteor.id().get(), hit_robot, "meteor exploded");
            out.push(Event::MeteorImpact {
                meteor: meteor.id(),
                hit_robot,
            });
            false
        });
        game_over
    }

    fn enter_game_over(&mut self, out: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.robot.set_grayscale(true);
        self.grid.set_grayscale(true);
        for crawler in &mut self.crawlers {
            crawler.set_grayscale(true);
        }
        for coin in &mut self.coins {
            coin.set_grayscale(true);
        }
        for meteor in &mut self.meteors {
            meteor.set_grayscale(true);
        }
        for explosion in &mut self.explosions {
            explosion.set_grayscale(true);
        }
        info!(score = self.scoreboard.score, "game over");
        out.push(Event::MusicChanged {
            cue: MusicCue::Play(Track::GameOver),
        });
        out.push(Event::GameOver);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Tuning::default(), ClipLibrary::standard())
    }
}

/// Takes a life and kills the robot; returns whether no lives remain.
fn kill_robot(
    robot: &mut Robot,
    tuning: &Tuning,
    clips: &ClipLibrary,
    out: &mut Vec<Event>,
) -> bool {
    let lives = robot.lose_life();
    robot.bounce(-tuning.death_bounce, true, clips);
    info!(lives, "robot killed");
    out.push(Event::SoundTriggered {
        cue: SoundCue::Death,
    });
    out.push(Event::MusicChanged {
        cue: MusicCue::Halt,
    });
    out.push(Event::RobotKilled { lives });
    lives == 0
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureScenes { scenes } => {
            info!(scenes = scenes.len(), "scenes configured");
            world.scenes = scenes;
            world.scene = None;
            world.grid = TileGrid::unset(world.tuning.tile_width, world.tuning.tile_height);
            world.crawlers.clear();
            world.coins.clear();
            world.meteors.clear();
            world.explosions.clear();
        }
        Command::LoadScene { scene, spawn_items } => {
            world.load_scene(scene, spawn_items, out_events);
        }
        Command::Tick { dt, input } => {
            if world.scene.is_none() {
                return;
            }
            let seconds = dt.as_secs_f32();
            world.clock += seconds;
            out_events.push(Event::TimeAdvanced { dt });
            world.step(seconds, input, out_events);
        }
        Command::SpawnCrawler {
            kind,
            x,
            bottom,
            facing,
        } => {
            if world.scene.is_none() {
                warn!(?kind, "ignoring crawler spawn without an active scene");
                return;
            }
            world.spawn_crawler(kind, x, bottom, facing, out_events);
        }
        Command::SpawnMeteor {
            center_x,
            rotation_speed,
        } => {
            if world.scene.is_none() {
                warn!("ignoring meteor spawn without an active scene");
                return;
            }
            world.spawn_meteor(center_x, rotation_speed, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Coin, Crawler, Explosion, Meteor, Robot, TileGrid, World};
    use robot_run_core::{SceneIndex, Tuning};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Gameplay constants the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Scene currently loaded, if any.
    #[must_use]
    pub fn scene(world: &World) -> Option<SceneIndex> {
        world.scene
    }

    /// Number of configured scenes.
    #[must_use]
    pub fn scene_count(world: &World) -> usize {
        world.scenes.len()
    }

    /// Provides read-only access to the active tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Provides read-only access to the robot.
    #[must_use]
    pub fn robot(world: &World) -> &Robot {
        &world.robot
    }

    /// Crawlers in the active scene, in spawn order.
    #[must_use]
    pub fn crawlers(world: &World) -> &[Crawler] {
        &world.crawlers
    }

    /// Coins in the active scene, in spawn order.
    #[must_use]
    pub fn coins(world: &World) -> &[Coin] {
        &world.coins
    }

    /// Meteors currently falling.
    #[must_use]
    pub fn meteors(world: &World) -> &[Meteor] {
        &world.meteors
    }

    /// Explosions currently playing.
    #[must_use]
    pub fn explosions(world: &World) -> &[Explosion] {
        &world.explosions
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.scoreboard.score
    }

    /// Lives the robot has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.robot.lives()
    }

    /// Whether the robot has run out of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Whether the robot has walked past the flagpole.
    #[must_use]
    pub fn goal_reached(world: &World) -> bool {
        world.goal_reached
    }

    /// Seconds of simulated time since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> f32 {
        world.clock
    }
}
