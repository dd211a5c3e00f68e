//! Frame composition against an abstract blit surface
//!
//! Rendering is a pure function of game state: every frame is described as
//! an ordered list of named-sprite blits. The shell supplies the `Surface`
//! that turns those names into pixels, which also makes frames easy to
//! assert on in tests.

use glam::IVec2;

use crate::consts::*;
use crate::sim::GameState;

/// Per-letter advance widths for the A-Z bitmap font. Digits and anything
/// below 'A' use the first entry.
const CHAR_WIDTH: [i32; 26] = [
    27, 26, 25, 26, 25, 25, 26, 25, 12, 26, 26, 25, 33, 25, 26, 25, 27, 26, 26, 25, 26, 26, 38,
    25, 25, 25,
];

/// Advance width of a digit glyph.
pub const NUMBER_WIDTH: i32 = CHAR_WIDTH[0];

pub const LIFE_ICON_WIDTH: i32 = 44;
pub const PLUS_ICON_WIDTH: i32 = 40;
pub const HEALTH_ICON_WIDTH: i32 = 40;

/// Receives named-sprite blits in back-to-front order.
pub trait Surface {
    fn blit(&mut self, sprite: &str, pos: IVec2);
}

pub fn char_width(c: char) -> i32 {
    let index = (c as i32 - 'A' as i32).max(0) as usize;
    CHAR_WIDTH[index.min(CHAR_WIDTH.len() - 1)]
}

fn text_width(text: &str) -> i32 {
    text.chars().map(char_width).sum()
}

/// Draw a line of bitmap-font text. With `x = None` the text is centred
/// horizontally.
pub fn draw_text(surface: &mut impl Surface, text: &str, y: i32, x: Option<i32>) {
    let mut x = x.unwrap_or_else(|| (WIDTH - text_width(text)) / 2);
    for c in text.chars() {
        surface.blit(&format!("font0{}", c as u32), IVec2::new(x, y));
        x += char_width(c);
    }
}

/// Draw the playfield: background, level tiles, then every entity with the
/// player on top.
pub fn draw_game(state: &GameState, surface: &mut impl Surface) {
    surface.blit(&format!("bg{}", state.level_colour), IVec2::ZERO);

    let block_sprite = format!("block{}", state.level % 4);
    for row_y in 0..NUM_ROWS {
        let row = state.grid.row(row_y as usize);
        let mut x = LEVEL_X_OFFSET;
        for tile in row.bytes() {
            if tile != b' ' {
                surface.blit(&block_sprite, IVec2::new(x, row_y * GRID_BLOCK_SIZE));
            }
            x += GRID_BLOCK_SIZE;
        }
    }

    for fruit in &state.fruits {
        surface.blit(&fruit.sprite(state.timer), fruit.body.top_left());
    }
    for bolt in &state.bolts {
        surface.blit(&bolt.sprite(state.timer), bolt.body.top_left());
    }
    for robot in &state.enemies {
        surface.blit(&robot.sprite(state.timer), robot.body.top_left());
    }
    for pop in &state.pops {
        surface.blit(&pop.sprite(), pop.body.top_left());
    }
    for orb in &state.orbs {
        surface.blit(&orb.sprite(), orb.body.top_left());
    }
    if let Some(player) = &state.player {
        surface.blit(&player.sprite(state.timer), player.body.top_left());
    }
}
