//! Level layouts and the tile grid
//!
//! A level is an ordered list of fixed-width row strings: a blank character
//! is empty, any other character is a solid tile. `Grid::load` appends a
//! duplicate of the first row so actors falling off the bottom of the screen
//! wrap onto matching terrain at the top.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The built-in level layouts, cycled as the session advances.
/// 17 rows each; the loader adds the wrap-sentinel row.
pub const LEVELS: [&[&str]; 3] = [
    &[
        "XXXXX     XXXXXXXX     XXXXX",
        "",
        "",
        "",
        "",
        "   XXXXXXX        XXXXXXX   ",
        "",
        "",
        "",
        "   XXXXXXXXXXXXXXXXXXXXXX   ",
        "",
        "",
        "",
        "XXXXXXXXX          XXXXXXXXX",
        "",
        "",
        "",
    ],
    &[
        "XXXX    XXXXXXXXXXXX    XXXX",
        "",
        "",
        "",
        "",
        "    XXXXXXXXXXXXXXXXXXXX    ",
        "",
        "",
        "",
        "XXXXXX                XXXXXX",
        "      X              X      ",
        "       X            X       ",
        "        X          X        ",
        "         X        X         ",
        "",
        "",
        "",
    ],
    &[
        "XXXX    XXXX    XXXX    XXXX",
        "",
        "",
        "",
        "",
        "  XXXXXXXX        XXXXXXXX  ",
        "",
        "",
        "",
        "XXXX      XXXXXXXX      XXXX",
        "",
        "",
        "",
        "    XXXXXX        XXXXXX    ",
        "",
        "",
        "",
    ],
];

/// The loaded tile grid for one level. Immutable once built; replaced
/// wholesale on level advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<String>,
}

impl Grid {
    /// Load the layout for the given level index (wrapping past the last
    /// layout) and append the wrap-sentinel row.
    pub fn load(level: usize) -> Self {
        Self::from_rows(LEVELS[level % LEVELS.len()])
    }

    /// Build a grid from raw rows, appending the first row as the last.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut rows: Vec<String> = rows.iter().map(|r| (*r).to_owned()).collect();
        let wrap = rows.first().cloned().unwrap_or_default();
        rows.push(wrap);
        Self { rows }
    }

    /// Is there a solid tile at pixel position (x, y)?
    ///
    /// Row 0 is exempt so wrapped actors can re-enter from the top; rows
    /// shorter than the grid width treat the missing columns as empty.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        let grid_x = (x - LEVEL_X_OFFSET).div_euclid(GRID_BLOCK_SIZE);
        let grid_y = y.div_euclid(GRID_BLOCK_SIZE);
        if grid_y <= 0 || grid_y >= self.rows.len() as i32 {
            return false;
        }
        if grid_x < 0 || grid_x >= NUM_COLUMNS {
            return false;
        }
        self.cell(grid_y as usize, grid_x as usize) != b' '
    }

    /// Is the given top-row column free for a robot to drop in from?
    pub fn column_free(&self, grid_x: usize) -> bool {
        self.rows
            .first()
            .is_none_or(|row| row.as_bytes().get(grid_x).is_none_or(|&c| c == b' '))
    }

    /// Raw row accessor for rendering. Panics on out-of-range rows, which
    /// cannot happen for grids built by `load`.
    pub fn row(&self, y: usize) -> &str {
        &self.rows[y]
    }

    fn cell(&self, row: usize, col: usize) -> u8 {
        self.rows[row].as_bytes().get(col).copied().unwrap_or(b' ')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_dimensions() {
        for level in LEVELS {
            assert_eq!(level.len(), (NUM_ROWS - 1) as usize);
            for row in level {
                assert!(row.is_empty() || row.len() == NUM_COLUMNS as usize);
            }
        }
    }

    #[test]
    fn test_wrap_row_duplicates_first() {
        let grid = Grid::load(0);
        assert_eq!(grid.row(0), grid.row((NUM_ROWS - 1) as usize));
    }

    #[test]
    fn test_is_solid_bounds() {
        let grid = Grid::load(0);
        // Row 0 never reports solid (wrap exemption)
        assert!(!grid.is_solid(LEVEL_X_OFFSET, 0));
        // Below the grid
        assert!(!grid.is_solid(LEVEL_X_OFFSET, NUM_ROWS * GRID_BLOCK_SIZE + 5));
        // Left of column 0
        assert!(!grid.is_solid(LEVEL_X_OFFSET - 30, 5 * GRID_BLOCK_SIZE));
    }

    #[test]
    fn test_is_solid_reads_tiles() {
        // Level 0 row 5: "   XXXXXXX        XXXXXXX   "
        let grid = Grid::load(0);
        let y = 5 * GRID_BLOCK_SIZE;
        assert!(!grid.is_solid(LEVEL_X_OFFSET, y));
        assert!(grid.is_solid(LEVEL_X_OFFSET + 3 * GRID_BLOCK_SIZE, y));
        assert!(grid.is_solid(LEVEL_X_OFFSET + 9 * GRID_BLOCK_SIZE, y));
        assert!(!grid.is_solid(LEVEL_X_OFFSET + 10 * GRID_BLOCK_SIZE, y));
    }

    #[test]
    fn test_short_rows_are_empty() {
        let grid = Grid::from_rows(&["XXXX", "XX"]);
        // Row 1 has only two columns; the rest read as empty
        assert!(grid.is_solid(LEVEL_X_OFFSET, GRID_BLOCK_SIZE));
        assert!(!grid.is_solid(LEVEL_X_OFFSET + 5 * GRID_BLOCK_SIZE, GRID_BLOCK_SIZE));
    }

    #[test]
    fn test_column_free_tolerates_short_rows() {
        let grid = Grid::from_rows(&["X "]);
        assert!(!grid.column_free(0));
        assert!(grid.column_free(1));
        // Past the end of the row counts as free
        assert!(grid.column_free(20));
    }
}
