//! Tilebound - a tile-based side-scrolling platformer runtime
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, collision, entities, player, cutscene)
//! - `level`: Level data contract, validation and the built-in reference level
//! - `session`: Host lifecycle (status, stats, lives, level timer)
//! - `input`: Key-state tracking that produces per-tick input snapshots
//! - `tuning`: Data-driven physics and gameplay constants

pub mod error;
pub mod input;
pub mod level;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::LoadError;
pub use level::LevelData;
pub use session::{GameStats, GameStatus, Session};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz logic)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 16.0;
    /// Viewport dimensions in pixels (unscaled)
    pub const SCREEN_WIDTH: f32 = 256.0;
    pub const SCREEN_HEIGHT: f32 = 240.0;

    /// Physics reference values (per tick at 60 Hz)
    pub const GRAVITY: f32 = 0.25;
    pub const FRICTION: f32 = 0.90;
    pub const ACCELERATION: f32 = 0.12;
    pub const MAX_WALK_SPEED: f32 = 1.4;
    pub const MAX_RUN_SPEED: f32 = 2.6;
    pub const MAX_FALL_SPEED: f32 = 10.0;
    pub const JUMP_FORCE: f32 = 6.6;
    /// Upward speed a released jump is clamped to
    pub const JUMP_CUT_SPEED: f32 = 2.5;
    pub const BOUNCE_FORCE: f32 = 3.5;
    pub const SPIN_BOUNCE_FORCE: f32 = 4.5;
    /// Below this horizontal speed friction snaps to zero
    pub const STOP_THRESHOLD: f32 = 0.1;

    /// Player collision box
    pub const PLAYER_WIDTH: f32 = 12.0;
    pub const SMALL_HEIGHT: f32 = 16.0;
    pub const BIG_HEIGHT: f32 = 32.0;

    pub const ENEMY_SPEED: f32 = 0.4;
    pub const MUSHROOM_SPEED: f32 = 0.8;
    pub const POWERUP_RISE_SPEED: f32 = 0.3;
    pub const POWERUP_SPAWN_FRAMES: u32 = 45;

    pub const FIREBALL_SPEED: f32 = 4.0;
    pub const FIREBALL_DROP: f32 = 2.0;
    pub const FIREBALL_BOUNCE: f32 = 3.0;
    pub const FIREBALL_SIZE: f32 = 8.0;
    pub const MAX_FIREBALLS: usize = 2;

    pub const INVULNERABILITY_FRAMES: u32 = 120;
    pub const DEATH_HOP: f32 = 3.0;
    /// Extra depth below the enemy's midline that still counts as a stomp
    pub const STOMP_TOLERANCE: f32 = 6.0;
    /// Horizontal margin around the viewport inside which entities update
    pub const ACTIVITY_MARGIN: f32 = 64.0;
    /// Distance below the level floor at which anything is considered lost
    pub const KILL_MARGIN: f32 = 32.0;

    pub const SLIDE_SPEED: f32 = 1.5;
    pub const CASTLE_WALK_SPEED: f32 = 1.0;
    /// Forward nudge when the slide ends
    pub const SLIDE_EXIT_NUDGE: f32 = 8.0;
    /// 500 ms at 60 Hz
    pub const VICTORY_STING_DELAY: u32 = 30;
    /// Death animation pause before the host restarts (2.5 s)
    pub const DEATH_PAUSE_TICKS: u32 = 150;

    pub const LEVEL_TIME: u32 = 400;
    pub const START_LIVES: u32 = 3;

    /// Fixed score rewards
    pub const SCORE_BRICK: u32 = 50;
    pub const SCORE_KILL: u32 = 100;
    pub const SCORE_COIN_TILE: u32 = 100;
    pub const SCORE_BLOCK_COIN: u32 = 200;
    pub const SCORE_POWERUP: u32 = 1000;

    /// Particle colors (0xRRGGBB)
    pub const COLOR_BRICK: u32 = 0xB8_34_10;
    pub const COLOR_GOOMBA: u32 = 0xE4_5C_10;
    pub const COLOR_FIRE: u32 = 0xF8_38_00;
    pub const COLOR_COIN: u32 = 0xF8_D8_20;
    pub const SKY_COLOR: &str = "#5C94FC";
}

/// Axis-aligned box overlap test (half-open, touching edges do not overlap)
#[inline]
pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// Pixel coordinate to tile index (floors, so negative pixels map to negative tiles)
#[inline]
pub fn to_tile(px: f32) -> i32 {
    (px / consts::TILE_SIZE).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rects_overlap_touching_is_not_overlap() {
        let size = Vec2::splat(16.0);
        assert!(!rects_overlap(Vec2::ZERO, size, Vec2::new(16.0, 0.0), size));
        assert!(rects_overlap(Vec2::ZERO, size, Vec2::new(15.9, 0.0), size));
    }

    #[test]
    fn test_to_tile_floors_negative() {
        assert_eq!(to_tile(0.0), 0);
        assert_eq!(to_tile(15.99), 0);
        assert_eq!(to_tile(16.0), 1);
        assert_eq!(to_tile(-0.5), -1);
    }
}
