//! Axis-separated kinematics against the tile grid
//!
//! Movement for one body is two sequential 1D sweeps, horizontal first and
//! then vertical. Each sweep adds the axis velocity, probes every tile the
//! leading edge spans, and snaps to the tile boundary on contact. The resolver
//! is discrete-step: a body moving more than one tile per tick on an axis can
//! tunnel. Fall speed is clamped well below a tile for that reason.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::grid::TileGrid;
use crate::consts::TILE_SIZE;
use crate::to_tile;

/// Keeps trailing-edge probes from reaching into a tile the box only touches
const PROBE_INSET: f32 = 0.1;

/// Position, velocity and box of anything that moves through the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in pixels
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub size: Vec2,
    /// Last vertical sweep ended on a floor
    pub grounded: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        crate::rects_overlap(self.pos, self.size, other.pos, other.size)
    }

    /// Tile columns the box spans
    pub(crate) fn cols(&self) -> (i32, i32) {
        (to_tile(self.pos.x), to_tile(self.right() - PROBE_INSET))
    }

    /// Tile rows the box spans
    pub(crate) fn rows(&self) -> (i32, i32) {
        (to_tile(self.pos.y), to_tile(self.bottom() - PROBE_INSET))
    }
}

/// Which boundary a sweep snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Horizontal sweep hit a wall in this column
    Wall { col: i32 },
    /// Vertical sweep landed on this row
    Floor { row: i32 },
    /// Vertical sweep struck the underside of this row across `first..=last` columns
    Ceiling { row: i32, first: i32, last: i32 },
}

/// Horizontal sweep: move by `vel.x`, snap against the leading column
pub fn move_x(body: &mut Body, grid: &TileGrid) -> Option<Contact> {
    body.pos.x += body.vel.x;

    let (top, bottom) = body.rows();
    let blocked = |col: i32| (top..=bottom).any(|row| grid.is_solid_at(col, row));

    if body.vel.x > 0.0 {
        let col = to_tile(body.right());
        if blocked(col) {
            body.pos.x = col as f32 * TILE_SIZE - body.size.x;
            body.vel.x = 0.0;
            return Some(Contact::Wall { col });
        }
    } else if body.vel.x < 0.0 {
        let col = to_tile(body.pos.x);
        if blocked(col) {
            body.pos.x = (col + 1) as f32 * TILE_SIZE;
            body.vel.x = 0.0;
            return Some(Contact::Wall { col });
        }
    }
    None
}

/// Vertical sweep: move by `vel.y`, snap against the leading row.
///
/// Clears `grounded` and sets it again only on a floor landing.
pub fn move_y(body: &mut Body, grid: &TileGrid) -> Option<Contact> {
    body.pos.y += body.vel.y;
    body.grounded = false;

    let (first, last) = body.cols();
    let blocked = |row: i32| (first..=last).any(|col| grid.is_solid_at(col, row));

    if body.vel.y > 0.0 {
        let row = to_tile(body.bottom());
        if blocked(row) {
            body.pos.y = row as f32 * TILE_SIZE - body.size.y;
            body.vel.y = 0.0;
            body.grounded = true;
            return Some(Contact::Floor { row });
        }
    } else if body.vel.y < 0.0 {
        let row = to_tile(body.pos.y);
        if blocked(row) {
            body.pos.y = (row + 1) as f32 * TILE_SIZE;
            body.vel.y = 0.0;
            return Some(Contact::Ceiling { row, first, last });
        }
    }
    None
}

/// What a non-player entity's sweep did to it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub x: Option<Contact>,
    pub y: Option<Contact>,
    /// Entity was destroyed by the contact (projectiles); the caller emits the burst
    pub destroyed: bool,
}

/// Move one entity through the grid and apply its kind's contact rules:
/// walkers turn around at walls, projectiles die on walls and ceilings and
/// bounce off floors.
pub fn resolve_entity(entity: &mut Entity, grid: &TileGrid, fireball_bounce: f32) -> Resolution {
    let mut res = Resolution {
        x: move_x(&mut entity.body, grid),
        ..Default::default()
    };

    if res.x.is_some() {
        match entity.kind {
            EntityKind::Fireball => {
                entity.dead = true;
                res.destroyed = true;
                return res;
            }
            EntityKind::GroundEnemy(_) | EntityKind::Mushroom => entity.facing = entity.facing.flipped(),
            _ => {}
        }
    }

    res.y = move_y(&mut entity.body, grid);
    if entity.kind == EntityKind::Fireball {
        match res.y {
            Some(Contact::Floor { .. }) => {
                entity.body.vel.y = -fireball_bounce;
                entity.body.grounded = false;
            }
            Some(Contact::Ceiling { .. }) => {
                entity.dead = true;
                res.destroyed = true;
            }
            _ => {}
        }
    }
    res
}
