use std::fs;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_run_core::{CrawlerKind, Spawn, SpawnKind, TileKind, TileSet};
use robot_run_level::{builtin_scenes, floor_layout, load_level, load_scenes, parse_level, LevelError};

#[test]
fn parses_tiles_and_spawns() {
    let layout = parse_level("..c.\n#@ws\n").expect("valid level");

    assert_eq!(layout.columns(), 4);
    assert_eq!(layout.rows(), 2);
    assert_eq!(layout.tile(0, 1), Some(TileKind::Solid(TileSet::Primary)));
    assert_eq!(layout.tile(1, 1), Some(TileKind::Solid(TileSet::Secondary)));
    assert_eq!(layout.tile(2, 1), Some(TileKind::Empty));
    assert_eq!(layout.tile(2, 0), Some(TileKind::Empty));
    assert_eq!(
        layout.spawns(),
        &[
            Spawn {
                kind: SpawnKind::Coin,
                column: 2,
                row: 0,
            },
            Spawn {
                kind: SpawnKind::Crawler(CrawlerKind::Weak),
                column: 2,
                row: 1,
            },
            Spawn {
                kind: SpawnKind::Crawler(CrawlerKind::Strong),
                column: 3,
                row: 1,
            },
        ]
    );
}

#[test]
fn accepts_windows_line_endings_and_trailing_blank_lines() {
    let layout = parse_level("..\r\n##\r\n\r\n\n").expect("valid level");

    assert_eq!(layout.columns(), 2);
    assert_eq!(layout.rows(), 2);
}

#[test]
fn rejects_ragged_rows() {
    let error = parse_level("....\n...\n").expect_err("ragged level");

    assert!(matches!(
        error,
        LevelError::RaggedRow {
            row: 1,
            expected: 4,
            found: 3,
        }
    ));
}

#[test]
fn symbols_are_case_sensitive() {
    let error = parse_level("..W.\n").expect_err("uppercase crawler");

    assert!(matches!(
        error,
        LevelError::UnknownTile {
            row: 0,
            column: 2,
            symbol: 'W',
        }
    ));
}

#[test]
fn rejects_empty_text() {
    assert!(matches!(parse_level("\n\n"), Err(LevelError::Empty)));
}

#[test]
fn loads_numbered_scenes_until_a_gap() {
    let dir = tempfile::tempdir().expect("temporary directory");
    fs::write(dir.path().join("level0.txt"), "..\n##\n").expect("write level0");
    fs::write(dir.path().join("level1.txt"), "c.\n#@\n").expect("write level1");
    fs::write(dir.path().join("level3.txt"), "..\n..\n").expect("write level3");

    let scenes = load_scenes(dir.path()).expect("scenes load");

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[1].spawns().len(), 1);
}

#[test]
fn reports_the_file_that_failed_to_parse() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("level0.txt");
    fs::write(&path, "..\n?.\n").expect("write level");

    let error = load_level(&path).expect_err("malformed level");

    assert!(error.to_string().contains("level0.txt"));
    assert!(matches!(error, LevelError::Malformed { .. }));
}

#[test]
fn empty_directory_has_no_scenes() {
    let dir = tempfile::tempdir().expect("temporary directory");

    assert!(matches!(
        load_scenes(dir.path()),
        Err(LevelError::NoScenes { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temporary directory");

    assert!(matches!(
        load_level(&dir.path().join("missing.txt")),
        Err(LevelError::Io { .. })
    ));
}

#[test]
fn floor_layout_is_solid_along_the_bottom_only() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let layout = floor_layout(20, 15, &mut rng);

    for column in 0..20 {
        assert!(matches!(layout.tile(column, 14), Some(TileKind::Solid(_))));
        assert_eq!(layout.tile(column, 13), Some(TileKind::Empty));
    }
    assert!(layout.spawns().is_empty());
}

#[test]
fn builtin_campaign_places_the_robot_on_solid_ground() {
    let scenes = builtin_scenes().expect("bundled levels are valid");

    for scene in &scenes {
        assert!(matches!(scene.tile(1, 14), Some(TileKind::Solid(_))));
        assert!(matches!(scene.tile(2, 14), Some(TileKind::Solid(_))));
    }
    assert!(scenes[0]
        .spawns()
        .iter()
        .any(|spawn| spawn.kind == SpawnKind::Crawler(CrawlerKind::Strong)));
}
