//! Tile grid backing collision queries for the active scene.

use robot_run_core::{LevelLayout, Rect, TileKind, TileSet};

/// Result of looking up a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TileQuery {
    /// The cell holds a solid tile.
    Solid {
        /// Pixel rectangle occupied by the cell.
        rect: Rect,
        /// Texture set of the tile.
        set: TileSet,
    },
    /// The cell is passable.
    Empty {
        /// Pixel rectangle occupied by the cell.
        rect: Rect,
    },
    /// The cell lies outside the grid.
    OutOfBounds {
        /// Pixel rectangle the cell would occupy.
        rect: Rect,
    },
}

impl TileQuery {
    /// Pixel rectangle of the queried cell.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        match self {
            Self::Solid { rect, .. } | Self::Empty { rect } | Self::OutOfBounds { rect } => *rect,
        }
    }

    /// Whether the cell stops robots and crawlers.
    ///
    /// The world boundary counts as blocking.
    #[must_use]
    pub const fn blocks(&self) -> bool {
        matches!(self, Self::Solid { .. } | Self::OutOfBounds { .. })
    }

    /// Whether the cell is passable space inside the grid.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Describes the discrete tile layout of the active scene.
#[derive(Clone, Debug)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_width: f32,
    tile_height: f32,
    tiles: Vec<TileKind>,
    grayscale: bool,
}

impl TileGrid {
    /// Grid with no cells; every query reports out of bounds.
    #[must_use]
    pub(crate) fn unset(tile_width: f32, tile_height: f32) -> Self {
        Self {
            columns: 0,
            rows: 0,
            tile_width,
            tile_height,
            tiles: Vec::new(),
            grayscale: false,
        }
    }

    /// Builds a grid from a parsed level layout.
    #[must_use]
    pub(crate) fn from_layout(layout: &LevelLayout, tile_width: f32, tile_height: f32) -> Self {
        Self {
            columns: layout.columns(),
            rows: layout.rows(),
            tile_width,
            tile_height,
            tiles: layout.tiles().to_vec(),
            grayscale: false,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width of a single cell in pixels.
    #[must_use]
    pub const fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Height of a single cell in pixels.
    #[must_use]
    pub const fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_width
    }

    /// Total height of the grid in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_height
    }

    /// Whether tiles should be drawn without colour.
    #[must_use]
    pub const fn grayscale(&self) -> bool {
        self.grayscale
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    /// Column containing the horizontal pixel coordinate.
    #[must_use]
    pub fn column_at(&self, x: f32) -> i64 {
        (x / self.tile_width).floor() as i64
    }

    /// Row containing the vertical pixel coordinate.
    #[must_use]
    pub fn row_at(&self, y: f32) -> i64 {
        (y / self.tile_height).floor() as i64
    }

    /// Looks up the cell at the provided row and column.
    ///
    /// Never fails: cells outside the grid are reported as
    /// [`TileQuery::OutOfBounds`].
    #[must_use]
    pub fn tile(&self, row: i64, column: i64) -> TileQuery {
        let rect = Rect::new(
            column as f32 * self.tile_width,
            row as f32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        );

        let (Ok(row), Ok(column)) = (u32::try_from(row), u32::try_from(column)) else {
            return TileQuery::OutOfBounds { rect };
        };
        if row >= self.rows || column >= self.columns {
            return TileQuery::OutOfBounds { rect };
        }

        let index = row as usize * self.columns as usize + column as usize;
        match self.tiles.get(index) {
            Some(TileKind::Solid(set)) => TileQuery::Solid { rect, set: *set },
            Some(TileKind::Empty) => TileQuery::Empty { rect },
            None => TileQuery::OutOfBounds { rect },
        }
    }

    /// Looks up the cell containing the provided pixel.
    #[must_use]
    pub fn tile_at(&self, x: f32, y: f32) -> TileQuery {
        self.tile(self.row_at(y), self.column_at(x))
    }

    /// Whether the cell containing the provided pixel blocks movement.
    #[must_use]
    pub fn blocks_at(&self, x: f32, y: f32) -> bool {
        self.tile_at(x, y).blocks()
    }

    /// Whether the pixel lies on ground a falling meteor should explode on.
    ///
    /// Solid tiles count, as does anything at or below the bottom of the grid;
    /// the sides and top of the world do not.
    #[must_use]
    pub fn is_floor_at(&self, x: f32, y: f32) -> bool {
        match self.tile_at(x, y) {
            TileQuery::Solid { .. } => true,
            TileQuery::Empty { .. } => false,
            TileQuery::OutOfBounds { .. } => y >= self.height(),
        }
    }

    /// Iterates over every solid tile with its pixel rectangle.
    pub fn solid_tiles(&self) -> impl Iterator<Item = (Rect, TileSet)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(move |(index, tile)| match tile {
                TileKind::Solid(set) => {
                    let columns = self.columns.max(1) as usize;
                    let column = (index % columns) as f32;
                    let row = (index / columns) as f32;
                    Some((
                        Rect::new(
                            column * self.tile_width,
                            row * self.tile_height,
                            self.tile_width,
                            self.tile_height,
                        ),
                        *set,
                    ))
                }
                TileKind::Empty => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_run_core::{LevelLayout, TileKind, TileSet};

    fn floor_grid() -> TileGrid {
        let mut tiles = vec![TileKind::Empty; 4 * 3];
        for column in 0..4 {
            tiles[2 * 4 + column] = TileKind::Solid(TileSet::Primary);
        }
        tiles[4 + 1] = TileKind::Solid(TileSet::Secondary);
        TileGrid::from_layout(&LevelLayout::new(4, 3, tiles, Vec::new()), 32.0, 32.0)
    }

    #[test]
    fn queries_distinguish_empty_solid_and_outside() {
        let grid = floor_grid();

        assert!(grid.tile(0, 0).is_empty());
        assert!(matches!(
            grid.tile(1, 1),
            TileQuery::Solid {
                set: TileSet::Secondary,
                ..
            }
        ));
        assert!(matches!(grid.tile(-1, 0), TileQuery::OutOfBounds { .. }));
        assert!(matches!(grid.tile(0, 4), TileQuery::OutOfBounds { .. }));
        assert!(grid.tile(3, 0).blocks());
    }

    #[test]
    fn pixel_lookups_floor_toward_negative_infinity() {
        let grid = floor_grid();

        assert_eq!(grid.column_at(-0.5), -1);
        assert_eq!(grid.row_at(63.99), 1);
        assert_eq!(grid.tile_at(40.0, 40.0).rect(), Rect::new(32.0, 32.0, 32.0, 32.0));
    }

    #[test]
    fn floor_excludes_the_sides_of_the_world() {
        let grid = floor_grid();

        assert!(grid.is_floor_at(10.0, 70.0));
        assert!(!grid.is_floor_at(-10.0, 10.0));
        assert!(grid.is_floor_at(-10.0, 200.0));
        assert!(!grid.is_floor_at(10.0, 10.0));
    }

    #[test]
    fn unset_grid_reports_everything_outside() {
        let grid = TileGrid::unset(32.0, 32.0);

        assert!(matches!(grid.tile(0, 0), TileQuery::OutOfBounds { .. }));
        assert_eq!(grid.solid_tiles().count(), 0);
    }

    #[test]
    fn solid_tiles_reports_every_solid_cell() {
        assert_eq!(floor_grid().solid_tiles().count(), 5);
    }
}
