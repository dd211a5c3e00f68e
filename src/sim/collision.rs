//! Anchored collision rects, stepped movement, and gravity
//!
//! Movement is resolved one pixel at a time against the tile grid. Tile
//! occupancy is only consulted when a step lands exactly on a tile boundary
//! in the direction of travel, which is what keeps actors flush against
//! walls and floors. Leftward travel checks `x % 25 == 24` rather than
//! `== 0`; this asymmetry is observable gameplay behaviour and must stay.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::levels::Grid;
use crate::consts::*;
use crate::sign;

/// Where an entity's (x, y) position sits on its collision rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Centre,
    /// Used by gravity-affected actors so y is the standing line
    CentreBottom,
}

/// Position plus collision rect: the movement capability shared by every
/// entity that interacts with the grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub pos: IVec2,
    pub size: IVec2,
    pub anchor: Anchor,
}

impl Body {
    pub fn new(pos: IVec2, size: IVec2, anchor: Anchor) -> Self {
        Self { pos, size, anchor }
    }

    pub fn left(&self) -> i32 {
        self.pos.x - self.size.x / 2
    }

    pub fn right(&self) -> i32 {
        self.left() + self.size.x
    }

    pub fn top(&self) -> i32 {
        match self.anchor {
            Anchor::Centre => self.pos.y - self.size.y / 2,
            Anchor::CentreBottom => self.pos.y - self.size.y,
        }
    }

    pub fn bottom(&self) -> i32 {
        self.top() + self.size.y
    }

    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.left(), self.top())
    }

    pub fn centre(&self) -> IVec2 {
        IVec2::new(self.pos.x, self.top() + self.size.y / 2)
    }

    /// Point-in-rect test (right and bottom edges exclusive).
    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Move up to `speed` pixels in direction (dx, dy), one pixel at a time.
    /// Returns true if movement was stopped by a tile or the playfield edge,
    /// leaving the body at the last free position.
    pub fn stepped_move(&mut self, grid: &Grid, dx: i32, dy: i32, speed: i32) -> bool {
        let mut new_x = self.pos.x;
        let mut new_y = self.pos.y;

        for _ in 0..speed {
            new_x += dx;
            new_y += dy;

            if new_x < PLAYFIELD_LEFT || new_x > PLAYFIELD_RIGHT {
                return true; // hit the playfield edge
            }

            // Only check tiles when crossing a boundary in the direction of
            // travel. Note the off-by-one on leftward crossings.
            let crossing = (dy > 0 && new_y.rem_euclid(GRID_BLOCK_SIZE) == 0)
                || (dx > 0 && new_x.rem_euclid(GRID_BLOCK_SIZE) == 0)
                || (dx < 0 && new_x.rem_euclid(GRID_BLOCK_SIZE) == GRID_BLOCK_SIZE - 1);
            if crossing && grid.is_solid(new_x, new_y) {
                return true;
            }

            self.pos = IVec2::new(new_x, new_y);
        }

        false
    }
}

/// Vertical velocity plus landing state: the falling capability layered on
/// top of `Body` by the player, robots, and fruit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Gravity {
    pub vel_y: i32,
    pub landed: bool,
}

impl Gravity {
    /// Accelerate downward (capped) and fall. With `detect` the fall is a
    /// stepped move that can land on tiles, and a body whose top edge passes
    /// the bottom of the screen wraps to the top. Without `detect` (the
    /// player's death fall) velocity is applied raw, with no landing and no
    /// wrap.
    pub fn apply(&mut self, body: &mut Body, grid: &Grid, detect: bool) {
        self.vel_y = (self.vel_y + 1).min(MAX_FALL_SPEED);

        if detect {
            if body.stepped_move(grid, 0, sign(self.vel_y), self.vel_y.abs()) {
                self.vel_y = 0;
                self.landed = true;
            }
            if body.top() >= HEIGHT {
                body.pos.y = 1;
            }
        } else {
            body.pos.y += self.vel_y;
        }
    }
}
