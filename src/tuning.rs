//! Data-driven game balance
//!
//! Every physics and gameplay constant the simulation reads lives here so a
//! host can override any subset from JSON. Missing fields keep the reference
//! values from [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::LoadError;

/// Physics and gameplay tuning (all speeds in pixels per tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player movement ===
    pub gravity: f32,
    /// Multiplicative horizontal damping when no direction is held
    pub friction: f32,
    pub acceleration: f32,
    pub max_walk_speed: f32,
    pub max_run_speed: f32,
    pub max_fall_speed: f32,
    pub jump_force: f32,
    pub jump_cut_speed: f32,
    pub bounce_force: f32,
    pub spin_bounce_force: f32,

    // === Entities ===
    pub enemy_speed: f32,
    pub mushroom_speed: f32,
    pub powerup_rise_speed: f32,
    pub powerup_spawn_frames: u32,
    pub fireball_speed: f32,
    pub fireball_drop: f32,
    pub fireball_bounce: f32,
    pub max_fireballs: usize,

    // === Damage ===
    pub invulnerability_frames: u32,
    pub death_hop: f32,
    pub stomp_tolerance: f32,

    // === World ===
    pub activity_margin: f32,
    pub kill_margin: f32,

    // === Level completion ===
    pub slide_speed: f32,
    pub castle_walk_speed: f32,
    pub victory_sting_delay: u32,

    // === Host pacing ===
    pub death_pause_ticks: u32,
    /// Level countdown in real seconds
    pub level_time: u32,
    pub start_lives: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            acceleration: ACCELERATION,
            max_walk_speed: MAX_WALK_SPEED,
            max_run_speed: MAX_RUN_SPEED,
            max_fall_speed: MAX_FALL_SPEED,
            jump_force: JUMP_FORCE,
            jump_cut_speed: JUMP_CUT_SPEED,
            bounce_force: BOUNCE_FORCE,
            spin_bounce_force: SPIN_BOUNCE_FORCE,

            enemy_speed: ENEMY_SPEED,
            mushroom_speed: MUSHROOM_SPEED,
            powerup_rise_speed: POWERUP_RISE_SPEED,
            powerup_spawn_frames: POWERUP_SPAWN_FRAMES,
            fireball_speed: FIREBALL_SPEED,
            fireball_drop: FIREBALL_DROP,
            fireball_bounce: FIREBALL_BOUNCE,
            max_fireballs: MAX_FIREBALLS,

            invulnerability_frames: INVULNERABILITY_FRAMES,
            death_hop: DEATH_HOP,
            stomp_tolerance: STOMP_TOLERANCE,

            activity_margin: ACTIVITY_MARGIN,
            kill_margin: KILL_MARGIN,

            slide_speed: SLIDE_SPEED,
            castle_walk_speed: CASTLE_WALK_SPEED,
            victory_sting_delay: VICTORY_STING_DELAY,

            death_pause_ticks: DEATH_PAUSE_TICKS,
            level_time: LEVEL_TIME,
            start_lives: START_LIVES,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON (unlisted fields keep defaults)
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Horizontal speed cap for the current run modifier
    pub fn target_speed(&self, running: bool) -> f32 {
        if running {
            self.max_run_speed
        } else {
            self.max_walk_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.5, "max_fireballs": 3 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.5);
        assert_eq!(tuning.max_fireballs, 3);
        assert_eq!(tuning.jump_force, JUMP_FORCE);
        assert_eq!(tuning.level_time, LEVEL_TIME);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ gravity: "),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_target_speed() {
        let tuning = Tuning::default();
        assert_eq!(tuning.target_speed(false), MAX_WALK_SPEED);
        assert_eq!(tuning.target_speed(true), MAX_RUN_SPEED);
    }
}
