#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level text format parser and scene loader for Robot Run.
//!
//! A level is a fixed-width grid of single characters, one line per row:
//!
//! | char | meaning                         |
//! |------|---------------------------------|
//! | `.`  | empty space                     |
//! | `#`  | solid tile, primary texture     |
//! | `@`  | solid tile, secondary texture   |
//! | `w`  | weak crawler spawn (cell empty) |
//! | `s`  | strong crawler spawn            |
//! | `c`  | coin spawn                      |
//!
//! Characters are case-sensitive. Trailing blank lines are ignored.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rand::Rng;
use robot_run_core::{CrawlerKind, LevelLayout, Spawn, SpawnKind, TileKind, TileSet};
use thiserror::Error;
use tracing::debug;

const BUILTIN_SCENES: [&str; 3] = [
    include_str!("../levels/level0.txt"),
    include_str!("../levels/level1.txt"),
    include_str!("../levels/level2.txt"),
];

/// Errors raised while reading or parsing level files.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file could not be read.
    #[error("failed to read level file {}", .path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A level file was read but its contents are malformed.
    #[error("malformed level file {}", .path.display())]
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: Box<LevelError>,
    },
    /// The text contains no rows.
    #[error("level contains no rows")]
    Empty,
    /// A row does not match the width of the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A character outside the level alphabet was found.
    #[error("unknown tile {symbol:?} at row {row}, column {column}")]
    UnknownTile {
        /// Zero-based row index.
        row: u32,
        /// Zero-based column index.
        column: u32,
        /// Offending character.
        symbol: char,
    },
    /// A scene directory holds no `level0.txt`.
    #[error("no level files found in {}", .path.display())]
    NoScenes {
        /// Directory that was searched.
        path: PathBuf,
    },
}

/// Parses level text into a layout.
pub fn parse_level(text: &str) -> Result<LevelLayout, LevelError> {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |index| index + 1);
    let lines = &lines[..end];

    let Some(first) = lines.first() else {
        return Err(LevelError::Empty);
    };
    let columns = count_u32(first.chars().count());
    let rows = count_u32(lines.len());

    let mut tiles = Vec::with_capacity(columns as usize * rows as usize);
    let mut spawns = Vec::new();
    for (row, line) in (0..rows).zip(lines.iter()) {
        let found = count_u32(line.chars().count());
        if found != columns {
            return Err(LevelError::RaggedRow {
                row,
                expected: columns,
                found,
            });
        }

        for (column, symbol) in (0..columns).zip(line.chars()) {
            let (tile, spawn) = match symbol {
                '.' => (TileKind::Empty, None),
                '#' => (TileKind::Solid(TileSet::Primary), None),
                '@' => (TileKind::Solid(TileSet::Secondary), None),
                'w' => (
                    TileKind::Empty,
                    Some(SpawnKind::Crawler(CrawlerKind::Weak)),
                ),
                's' => (
                    TileKind::Empty,
                    Some(SpawnKind::Crawler(CrawlerKind::Strong)),
                ),
                'c' => (TileKind::Empty, Some(SpawnKind::Coin)),
                symbol => {
                    return Err(LevelError::UnknownTile {
                        row,
                        column,
                        symbol,
                    })
                }
            };
            tiles.push(tile);
            if let Some(kind) = spawn {
                spawns.push(Spawn { kind, column, row });
            }
        }
    }

    Ok(LevelLayout::new(columns, rows, tiles, spawns))
}

/// Reads and parses a single level file.
pub fn load_level(path: &Path) -> Result<LevelLayout, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&text).map_err(|source| LevelError::Malformed {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// Loads `level0.txt`, `level1.txt`, ... from `dir` until a number is missing.
pub fn load_scenes(dir: &Path) -> Result<Vec<LevelLayout>, LevelError> {
    let mut scenes = Vec::new();
    loop {
        let path = dir.join(format!("level{}.txt", scenes.len()));
        if !path.is_file() {
            break;
        }
        let layout = load_level(&path)?;
        debug!(
            path = %path.display(),
            columns = layout.columns(),
            rows = layout.rows(),
            spawns = layout.spawns().len(),
            "level loaded"
        );
        scenes.push(layout);
    }

    if scenes.is_empty() {
        return Err(LevelError::NoScenes {
            path: dir.to_path_buf(),
        });
    }
    Ok(scenes)
}

/// Scenes bundled with the game.
pub fn builtin_scenes() -> Result<Vec<LevelLayout>, LevelError> {
    BUILTIN_SCENES.iter().map(|text| parse_level(text)).collect()
}

/// Single-row floor of randomly textured tiles with empty space above it.
#[must_use]
pub fn floor_layout<R: Rng + ?Sized>(columns: u32, rows: u32, rng: &mut R) -> LevelLayout {
    let mut tiles = vec![TileKind::Empty; columns as usize * rows as usize];
    if rows > 0 {
        let floor_start = (rows as usize - 1) * columns as usize;
        for tile in &mut tiles[floor_start..] {
            let set = if rng.gen_bool(0.5) {
                TileSet::Primary
            } else {
                TileSet::Secondary
            };
            *tile = TileKind::Solid(set);
        }
    }
    LevelLayout::new(columns, rows, tiles, Vec::new())
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenes_parse_and_share_dimensions() {
        let scenes = builtin_scenes().expect("bundled levels are valid");

        assert_eq!(scenes.len(), 3);
        for scene in &scenes {
            assert_eq!(scene.columns(), 20);
            assert_eq!(scene.rows(), 15);
            for column in 0..20 {
                assert!(matches!(scene.tile(column, 14), Some(TileKind::Solid(_))));
            }
        }
    }
}
