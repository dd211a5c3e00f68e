//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-frame stepping only (one `tick` per external frame)
//! - Seeded RNG only, owned by the game state
//! - Integer-pixel positions; movement is stepped one pixel at a time
//! - No rendering or platform dependencies

pub mod collision;
pub mod levels;
pub mod state;
pub mod tick;

pub use collision::{Anchor, Body, Gravity};
pub use levels::{Grid, LEVELS};
pub use state::{
    Bolt, Fruit, FruitKind, GameEvent, GameState, Orb, Player, Pop, Robot, RobotKind, Sound,
};
pub use tick::{next_level, tick};
