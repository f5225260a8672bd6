//! Host-side run lifecycle
//!
//! A `Session` owns the pristine level, the live `GameState`, and everything
//! the HUD reads: status, score, coins, lives, and the level countdown. It
//! drains simulation events after every tick and folds them into stats.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::level::LevelData;
use crate::sim::events::{DeathCause, GameEvent};
use crate::sim::state::{DEFAULT_SEED, GameState};
use crate::sim::tick::{TickInput, tick};
use crate::tuning::Tuning;

/// Largest real frame delta the accumulator accepts (avoids a catch-up spiral)
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    /// Death animation running; the level restarts (or the game ends) after it
    Dying,
    GameOver,
    Victory,
}

/// HUD-facing run statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub coins: u32,
    pub world: String,
    /// Seconds left on the level clock
    pub time: u32,
    pub lives: u32,
}

impl GameStats {
    pub fn new(world: &str, tuning: &Tuning) -> Self {
        Self {
            score: 0,
            coins: 0,
            world: world.to_string(),
            time: tuning.level_time,
            lives: tuning.start_lives,
        }
    }

    fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Score { points } => self.score += u64::from(*points),
            GameEvent::Coin => self.coins += 1,
            _ => {}
        }
    }
}

#[derive(Debug)]
pub struct Session {
    tuning: Tuning,
    seed: u64,
    status: GameStatus,
    stats: GameStats,
    /// Untouched copy used for every restart
    level: Option<LevelData>,
    state: Option<GameState>,
    /// Unsimulated real time
    accumulator: f32,
    /// Real time toward the next countdown second
    clock: f32,
    /// Ticks left in the death pause
    death_ticks: u32,
}

impl Session {
    pub fn new(tuning: Tuning) -> Self {
        Self::with_seed(tuning, DEFAULT_SEED)
    }

    pub fn with_seed(tuning: Tuning, seed: u64) -> Self {
        let stats = GameStats::new("", &tuning);
        Self {
            tuning,
            seed,
            status: GameStatus::Menu,
            stats,
            level: None,
            state: None,
            accumulator: 0.0,
            clock: 0.0,
            death_ticks: 0,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Live simulation, if a run exists
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Begin a fresh run on `level` with reset stats
    pub fn start(&mut self, level: LevelData, world: &str) {
        self.stats = GameStats::new(world, &self.tuning);
        self.level = Some(level);
        self.restart_level();
        log::info!("Run started on world {world}");
    }

    /// Return to the menu and drop the run
    pub fn stop(&mut self) {
        self.status = GameStatus::Menu;
        self.state = None;
        self.level = None;
        self.accumulator = 0.0;
    }

    pub fn pause(&mut self) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Playing;
            self.accumulator = 0.0;
        }
    }

    /// Run exactly one simulation tick. Ticks only while playing or dying.
    pub fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
        if !matches!(self.status, GameStatus::Playing | GameStatus::Dying) {
            return Vec::new();
        }
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        let was_dying = self.status == GameStatus::Dying;
        tick(state, input);
        let events = state.drain_events();
        self.absorb(&events);

        if was_dying {
            self.death_ticks = self.death_ticks.saturating_sub(1);
            if self.death_ticks == 0 {
                self.respawn_or_end();
            }
        }
        events
    }

    /// Advance by real time: fixed-step ticks plus the level clock.
    ///
    /// Press edges in `input` apply to the first substep only.
    pub fn frame(&mut self, real_dt: f32, input: &TickInput) -> Vec<GameEvent> {
        // The clock follows wall time; only the simulation catch-up is capped
        let mut events = self.advance_clock(real_dt.max(0.0));
        self.accumulator += real_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        let mut input = *input;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.step(&input));
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input = input.without_presses();
        }
        events
    }

    /// Count the level clock down in real seconds. Stopped outside normal
    /// play (paused, dying, cutscene). Reaching zero kills the player.
    pub fn advance_clock(&mut self, real_dt: f32) -> Vec<GameEvent> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        if state.player.dead || state.cutscene.is_active() {
            return Vec::new();
        }

        self.clock += real_dt;
        while self.clock >= 1.0 && self.stats.time > 0 {
            self.clock -= 1.0;
            self.stats.time -= 1;
        }
        if self.stats.time > 0 {
            return Vec::new();
        }

        state.kill_player(DeathCause::TimeUp);
        let events = state.drain_events();
        self.absorb(&events);
        events
    }

    /// Fold drained events into stats and status
    fn absorb(&mut self, events: &[GameEvent]) {
        for event in events {
            self.stats.apply(event);
            match event {
                GameEvent::PlayerDied { .. } => {
                    self.status = GameStatus::Dying;
                    self.death_ticks = self.tuning.death_pause_ticks.max(1);
                }
                GameEvent::LevelComplete => {
                    self.status = GameStatus::Victory;
                    log::info!("Victory with score {}", self.stats.score);
                }
                _ => {}
            }
        }
    }

    fn respawn_or_end(&mut self) {
        if self.stats.lives == 0 {
            self.status = GameStatus::GameOver;
            log::info!("Game over with score {}", self.stats.score);
            return;
        }
        self.stats.lives -= 1;
        self.stats.time = self.tuning.level_time;
        self.restart_level();
        log::info!("Respawned, {} lives left", self.stats.lives);
    }

    /// Rebuild the live state from the pristine level
    fn restart_level(&mut self) {
        let Some(level) = self.level.as_ref() else {
            self.status = GameStatus::Menu;
            return;
        };
        self.state = Some(GameState::with_seed(level, self.tuning.clone(), self.seed));
        self.status = GameStatus::Playing;
        self.accumulator = 0.0;
        self.clock = 0.0;
        self.death_ticks = 0;
    }
}
