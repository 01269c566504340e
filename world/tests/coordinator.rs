use std::time::Duration;

use robot_run_core::{
    Action, ClipLibrary, Command, CrawlerKind, Event, Facing, InputSnapshot, LevelLayout,
    MusicCue, SceneIndex, SoundCue, Track, Tuning,
};
use robot_run_level::parse_level;
use robot_run_world::{self as world, query, RobotState, World};

const EMPTY_ROW: &str = "....................";
const FLOOR_ROW: &str = "####################";

fn frame() -> Duration {
    Duration::from_nanos(16_666_667)
}

/// 20x15 level with a full floor row; `overrides` replace whole rows.
fn level(overrides: &[(usize, &str)]) -> LevelLayout {
    let mut rows = vec![EMPTY_ROW; 15];
    rows[14] = FLOOR_ROW;
    for (row, text) in overrides {
        rows[*row] = text;
    }
    parse_level(&rows.join("\n")).expect("test level is well formed")
}

fn world_with(tuning: Tuning, scenes: Vec<LevelLayout>) -> World {
    let mut world = World::new(tuning, ClipLibrary::standard());
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureScenes { scenes }, &mut events);
    world::apply(
        &mut world,
        Command::LoadScene {
            scene: SceneIndex::new(0),
            spawn_items: true,
        },
        &mut events,
    );
    world
}

fn tick(world: &mut World, input: InputSnapshot) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: frame(),
            input,
        },
        &mut events,
    );
    events
}

fn run(world: &mut World, frames: usize, input: InputSnapshot) -> Vec<Event> {
    let mut log = Vec::new();
    for _ in 0..frames {
        log.extend(tick(world, input));
    }
    log
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

fn standing_over_crawler(kind: CrawlerKind, spawn_bottom: f32, lives: u32) -> World {
    let tuning = Tuning {
        crawler_speed: 0.0,
        spawn_x: 210.0,
        spawn_bottom,
        starting_lives: lives,
        ..Tuning::default()
    };
    let mut world = world_with(tuning, vec![level(&[])]);
    let events = apply(
        &mut world,
        Command::SpawnCrawler {
            kind,
            x: 200.0,
            bottom: 448.0,
            facing: Facing::Left,
        },
    );
    assert_eq!(count(&events, |e| matches!(e, Event::CrawlerSpawned { .. })), 1);
    world
}

#[test]
fn ticks_before_a_scene_is_loaded_are_ignored() {
    let mut world = World::default();

    assert!(tick(&mut world, InputSnapshot::new().with(Action::Right)).is_empty());
    assert!(apply(
        &mut world,
        Command::LoadScene {
            scene: SceneIndex::new(0),
            spawn_items: true,
        },
    )
    .is_empty());
    assert!(apply(
        &mut world,
        Command::SpawnMeteor {
            center_x: 100.0,
            rotation_speed: 90.0,
        },
    )
    .is_empty());
    assert_eq!(query::scene(&world), None);
    assert_eq!(query::clock(&world), 0.0);
}

#[test]
fn gravity_accumulates_each_airborne_frame_until_landing() {
    let tuning = Tuning {
        spawn_bottom: 200.0,
        ..Tuning::default()
    };
    let step = tuning.gravity * frame().as_secs_f32();
    let mut world = world_with(tuning, vec![level(&[])]);

    let mut previous = 0.0;
    let mut landed = false;
    for _ in 0..120 {
        let _ = tick(&mut world, InputSnapshot::new());
        let robot = query::robot(&world);
        match robot.state() {
            RobotState::Falling { velocity } => {
                assert!((velocity - previous - step).abs() < 0.05);
                previous = velocity;
            }
            RobotState::Grounded => {
                assert!(previous > 0.0, "robot landed without falling");
                assert_eq!(robot.velocity(), 0.0);
                assert_eq!(robot.bottom(), 448.0);
                landed = true;
                break;
            }
            other => panic!("unexpected robot state: {other:?}"),
        }
    }
    assert!(landed);
}

#[test]
fn screen_edges_advance_and_retreat_between_scenes() {
    let tuning = Tuning {
        spawn_x: 590.0,
        ..Tuning::default()
    };
    let scenes = vec![
        level(&[(13, "..c.................")]),
        level(&[(13, "...............w....")]),
        level(&[]),
    ];
    let mut world = world_with(tuning, scenes);
    assert_eq!(query::coins(&world).len(), 1);

    let mut advanced = Vec::new();
    for _ in 0..10 {
        advanced = tick(&mut world, InputSnapshot::new().with(Action::Right));
        if query::scene(&world) == Some(SceneIndex::new(1)) {
            break;
        }
    }
    assert!(advanced.contains(&Event::SceneLoaded {
        scene: SceneIndex::new(1),
        spawn_items: true,
    }));
    assert_eq!(query::robot(&world).x(), -10.0);
    assert_eq!(query::crawlers(&world).len(), 1);
    assert!(query::coins(&world).is_empty());

    let retreated = tick(&mut world, InputSnapshot::new().with(Action::Left));
    assert!(retreated.contains(&Event::SceneLoaded {
        scene: SceneIndex::new(0),
        spawn_items: false,
    }));
    assert_eq!(query::scene(&world), Some(SceneIndex::new(0)));
    assert_eq!(query::robot(&world).x(), 640.0 - 48.0);
    assert!(query::coins(&world).is_empty());
    assert!(query::crawlers(&world).is_empty());
}

#[test]
fn first_scene_clamps_the_left_edge() {
    let tuning = Tuning {
        spawn_x: 0.0,
        ..Tuning::default()
    };
    let mut world = world_with(tuning, vec![level(&[]), level(&[])]);

    let events = run(&mut world, 30, InputSnapshot::new().with(Action::Left));

    assert_eq!(query::robot(&world).x(), -10.0);
    assert_eq!(query::scene(&world), Some(SceneIndex::new(0)));
    assert_eq!(
        count(&events, |e| matches!(e, Event::SceneLoaded { .. })),
        0
    );
}

#[test]
fn collected_coin_is_removed_after_pickup_frames() {
    let mut world = world_with(Tuning::default(), vec![level(&[(13, ".c..................")])]);
    let coin = query::coins(&world)[0].id();

    let first = tick(&mut world, InputSnapshot::new());
    assert!(first.contains(&Event::SoundTriggered {
        cue: SoundCue::Coin,
    }));
    assert!(first.contains(&Event::CoinCollected { coin }));
    assert!(first.contains(&Event::ScoreChanged { score: 10 }));

    for _ in 2..5 {
        let events = tick(&mut world, InputSnapshot::new());
        assert!(!events.contains(&Event::CoinRemoved { coin }));
        assert_eq!(query::coins(&world).len(), 1);
    }

    let fifth = tick(&mut world, InputSnapshot::new());
    assert!(fifth.contains(&Event::CoinRemoved { coin }));
    assert!(query::coins(&world).is_empty());
    assert_eq!(query::score(&world), 10);
}

#[test]
fn crossing_the_score_threshold_awards_a_life() {
    let tuning = Tuning {
        coin_points: 1000,
        extra_life_every: 1000,
        ..Tuning::default()
    };
    let mut world = world_with(tuning, vec![level(&[(13, ".c..................")])]);

    let events = tick(&mut world, InputSnapshot::new());

    assert!(events.contains(&Event::SoundTriggered {
        cue: SoundCue::LifeGain,
    }));
    assert!(events.contains(&Event::LifeGained { lives: 6 }));
    assert_eq!(query::lives(&world), 6);
}

#[test]
fn stomped_weak_crawler_dies_and_is_removed_once() {
    let mut world = standing_over_crawler(CrawlerKind::Weak, 300.0, 5);

    let events = run(&mut world, 120, InputSnapshot::new());

    let stomps: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            Event::CrawlerStomped { killed, .. } => Some(*killed),
            _ => None,
        })
        .collect();
    assert_eq!(stomps, vec![true]);
    assert!(events.contains(&Event::SoundTriggered {
        cue: SoundCue::StompKill,
    }));
    assert_eq!(
        count(&events, |e| matches!(e, Event::CrawlerRemoved { .. })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, Event::RobotKilled { .. })),
        0
    );
    assert!(query::crawlers(&world).is_empty());
    assert_eq!(query::score(&world), 50);
    assert_eq!(query::lives(&world), 5);
}

#[test]
fn strong_crawler_survives_the_first_stomp() {
    let mut world = standing_over_crawler(CrawlerKind::Strong, 300.0, 5);

    let events = run(&mut world, 150, InputSnapshot::new());

    let stomps: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            Event::CrawlerStomped { killed, .. } => Some(*killed),
            _ => None,
        })
        .collect();
    assert_eq!(stomps, vec![false, true]);
    assert!(events.contains(&Event::SoundTriggered {
        cue: SoundCue::StompNoKill,
    }));
    assert_eq!(
        count(&events, |e| matches!(e, Event::CrawlerRemoved { .. })),
        1
    );
    assert_eq!(query::lives(&world), 5);
    assert_eq!(query::score(&world), 100);
}

#[test]
fn losing_the_last_life_turns_the_world_gray() {
    let mut world = standing_over_crawler(CrawlerKind::Weak, 448.0, 1);
    let _ = apply(
        &mut world,
        Command::SpawnMeteor {
            center_x: 500.0,
            rotation_speed: 90.0,
        },
    );

    let first = tick(&mut world, InputSnapshot::new());

    assert!(first.contains(&Event::RobotKilled { lives: 0 }));
    assert!(first.contains(&Event::GameOver));
    assert!(first.contains(&Event::MusicChanged {
        cue: MusicCue::Play(Track::GameOver),
    }));
    assert!(query::is_game_over(&world));
    assert!(query::robot(&world).is_dead());
    assert!(query::robot(&world).grayscale());
    assert!(query::tile_grid(&world).grayscale());
    assert!(query::crawlers(&world).iter().all(|c| c.grayscale()));
    assert!(query::meteors(&world).iter().all(|m| m.grayscale()));

    let later = run(&mut world, 300, InputSnapshot::new().with(Action::Resurrect));
    assert!(!later.contains(&Event::RobotResurrected));
    assert_eq!(
        count(&later, |e| matches!(e, Event::GameOver)),
        0,
        "game over is announced once"
    );
    assert!(query::robot(&world).is_dead());
}

#[test]
fn resurrection_reloads_the_first_scene() {
    let mut world = standing_over_crawler(CrawlerKind::Weak, 448.0, 2);

    let first = tick(&mut world, InputSnapshot::new());
    assert!(first.contains(&Event::RobotKilled { lives: 1 }));
    assert!(!query::is_game_over(&world));

    let events = run(&mut world, 120, InputSnapshot::new().with(Action::Resurrect));

    assert_eq!(
        count(&events, |e| matches!(e, Event::RobotResurrected)),
        1
    );
    assert!(events.contains(&Event::SceneLoaded {
        scene: SceneIndex::new(0),
        spawn_items: true,
    }));
    assert!(events.contains(&Event::MusicChanged {
        cue: MusicCue::Play(Track::Main),
    }));
    let robot = query::robot(&world);
    assert!(!robot.is_dead());
    assert_eq!(robot.lives(), 1);
    assert!(query::crawlers(&world).is_empty());
}

#[test]
fn meteor_striking_the_robot_costs_a_life() {
    let mut world = world_with(Tuning::default(), vec![level(&[])]);
    let center_x = query::robot(&world).collision_rect().center_x();
    let _ = apply(
        &mut world,
        Command::SpawnMeteor {
            center_x,
            rotation_speed: -120.0,
        },
    );

    let mut events = Vec::new();
    for _ in 0..200 {
        events = tick(&mut world, InputSnapshot::new());
        if query::meteors(&world).is_empty() {
            break;
        }
    }

    assert!(events.iter().any(|e| matches!(
        e,
        Event::MeteorImpact {
            hit_robot: true,
            ..
        }
    )));
    assert!(events.contains(&Event::RobotKilled { lives: 4 }));
    assert_eq!(query::explosions(&world).len(), 1);
    assert!(query::robot(&world).is_dead());
}

#[test]
fn meteor_hitting_the_floor_explodes_with_a_thud() {
    let mut world = world_with(Tuning::default(), vec![level(&[])]);
    let _ = apply(
        &mut world,
        Command::SpawnMeteor {
            center_x: 400.0,
            rotation_speed: 45.0,
        },
    );

    let mut impact = Vec::new();
    for _ in 0..200 {
        impact = tick(&mut world, InputSnapshot::new());
        if query::meteors(&world).is_empty() {
            break;
        }
    }

    assert!(impact.contains(&Event::SoundTriggered {
        cue: SoundCue::Thud,
    }));
    assert!(impact.iter().any(|e| matches!(
        e,
        Event::MeteorImpact {
            hit_robot: false,
            ..
        }
    )));
    assert_eq!(query::explosions(&world).len(), 1);

    let _ = run(&mut world, 90, InputSnapshot::new());
    assert!(query::explosions(&world).is_empty());
    assert_eq!(query::lives(&world), 5);
}

#[test]
fn final_scene_walks_the_robot_to_the_flagpole() {
    let mut world = world_with(Tuning::default(), vec![level(&[])]);

    let events = run(&mut world, 300, InputSnapshot::new().with(Action::Left));

    assert_eq!(count(&events, |e| matches!(e, Event::GoalReached)), 1);
    assert!(events.contains(&Event::MusicChanged {
        cue: MusicCue::Play(Track::Victory),
    }));
    assert!(query::goal_reached(&world));
    assert_eq!(
        query::robot(&world).state(),
        RobotState::AutoPilot { celebrating: true }
    );
}
