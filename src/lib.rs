//! Cavern - a bubble-trap arcade platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid collision, entities, game session)
//! - `input`: Per-frame input snapshots with edge detection
//! - `audio`: Sound dispatch with swallow-and-log failure handling
//! - `render`: Sprite blit contract consumed by any front end
//! - `app`: Menu / play / game-over screen state machine

pub mod app;
pub mod audio;
pub mod input;
pub mod render;
pub mod sim;

pub use app::App;
pub use input::{InputState, InputTracker};

/// Game configuration constants
pub mod consts {
    /// Window dimensions in pixels
    pub const WIDTH: i32 = 800;
    pub const HEIGHT: i32 = 480;

    /// Level grid dimensions (the last row duplicates the first for
    /// wrap-around detection, so loaded grids hold NUM_ROWS rows)
    pub const NUM_ROWS: i32 = 18;
    pub const NUM_COLUMNS: i32 = 28;

    pub const LEVEL_X_OFFSET: i32 = 50;
    pub const GRID_BLOCK_SIZE: i32 = 25;

    /// Horizontal playfield bounds - no actor anchor may leave this range
    pub const PLAYFIELD_LEFT: i32 = 70;
    pub const PLAYFIELD_RIGHT: i32 = 730;

    /// Terminal velocity for gravity-affected actors
    pub const MAX_FALL_SPEED: i32 = 10;

    /// Collision rect sizes, mirroring the sprite sheet dimensions.
    /// Player and robots anchor at centre-bottom, orbs and bolts at centre.
    pub const PLAYER_WIDTH: i32 = 70;
    pub const PLAYER_HEIGHT: i32 = 70;
    pub const ROBOT_WIDTH: i32 = 70;
    pub const ROBOT_HEIGHT: i32 = 70;
    pub const ORB_WIDTH: i32 = 70;
    pub const ORB_HEIGHT: i32 = 70;
    pub const FRUIT_WIDTH: i32 = 40;
    pub const FRUIT_HEIGHT: i32 = 40;
    pub const BOLT_WIDTH: i32 = 40;
    pub const BOLT_HEIGHT: i32 = 12;
    pub const POP_WIDTH: i32 = 70;
    pub const POP_HEIGHT: i32 = 70;
}

/// Sign convention used throughout the simulation: -1 for negative,
/// +1 for zero or positive (zero counts as facing right / falling down).
#[inline]
pub fn sign(x: i32) -> i32 {
    if x < 0 { -1 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::sign;

    #[test]
    fn test_sign_zero_is_positive() {
        assert_eq!(sign(-3), -1);
        assert_eq!(sign(0), 1);
        assert_eq!(sign(7), 1);
    }
}
