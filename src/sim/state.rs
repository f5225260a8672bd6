//! Live simulation state
//!
//! Everything a tick reads or writes lives here. A `GameState` is built from
//! a `LevelData` by deep copy, so the source level is never mutated and a run
//! can be restarted from it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cutscene::{FLAG_OFFSET, FinishLine, POLE_WIDTH, Sequencer};
use super::entity::{Entity, EntityKind, EntityRegistry};
use super::events::{DeathCause, GameEvent, SoundCue};
use super::grid::{Tile, TileGrid};
use super::player::Player;
use crate::consts::*;
use crate::level::{LevelData, find_safe_start};
use crate::tuning::Tuning;

/// Seed used when the host doesn't pick one
pub const DEFAULT_SEED: u64 = 0x5EED_0101;

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Debris pieces per burst
const DEBRIS_COUNT: usize = 4;
/// Debris lifetime in ticks
const DEBRIS_LIFE: u32 = 60;
/// Coin pop-up lifetime in ticks
const COIN_POPUP_LIFE: u32 = 20;

/// Row the slide ends on when the pole has no solid base
const SLIDE_FLOOR_FALLBACK_ROW: i32 = 12;

/// Castle door distance past the pole when the level has no castle tile
const CASTLE_FALLBACK_OFFSET: f32 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Block or enemy fragments
    Debris,
    /// Coin popping out of a question block
    CoinPopup,
}

/// Purely visual effect particle (not gameplay-affecting)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Packed 0xRRGGBB
    pub color: u32,
    /// Ticks left
    pub life: u32,
    pub kind: ParticleKind,
}

/// Horizontal scroll. Only ever moves right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
}

impl Camera {
    /// Advance toward `target`, never backwards and never past `max_x`
    pub fn follow(&mut self, target: f32, max_x: f32) {
        let target = target.min(max_x);
        if target > self.x {
            self.x = target;
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub grid: TileGrid,
    pub player: Player,
    pub entities: EntityRegistry,
    /// Flag marker on the goal pole, if the level has one
    pub flag: Option<Entity>,
    pub finish: Option<FinishLine>,
    pub cutscene: Sequencer,
    pub camera: Camera,
    pub particles: Vec<Particle>,
    pub background: String,
    /// Simulation tick counter
    pub frame: u64,
    pub(crate) events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    pub fn new(level: &LevelData, tuning: Tuning) -> Self {
        Self::with_seed(level, tuning, DEFAULT_SEED)
    }

    /// Build a fresh run from `level`. The particle RNG is seeded so replays
    /// are bit-identical.
    pub fn with_seed(level: &LevelData, tuning: Tuning, seed: u64) -> Self {
        let mut grid = level.build_grid();
        let (flag, finish) = extract_goal(&mut grid);

        let mut entities = EntityRegistry::new();
        for entity in level.build_entities(&tuning) {
            entities.insert(entity);
        }

        let (start, on_ground) = find_safe_start(&grid, SMALL_HEIGHT);
        let mut player = Player::new(start);
        player.body.grounded = on_ground;

        log::info!(
            "Level ready: {}x{} tiles, {} entities, goal {}",
            grid.width(),
            grid.height(),
            entities.len(),
            if finish.is_some() { "present" } else { "absent" }
        );

        Self {
            tuning,
            grid,
            player,
            entities,
            flag,
            finish,
            cutscene: Sequencer::default(),
            camera: Camera::default(),
            particles: Vec::new(),
            background: level.background_color.clone(),
            frame: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Start the death sequence. Only the first call has any effect.
    pub fn kill_player(&mut self, cause: DeathCause) {
        if self.player.dead {
            return;
        }
        self.player.start_death(self.tuning.death_hop);
        self.emit(GameEvent::PlayerDied { cause });
        self.sound(SoundCue::Die);
        log::info!("Player died ({cause:?}) at x={:.0}", self.player.body.pos.x);
    }

    /// Anything below this y is removed (or killed, for the player)
    pub fn kill_y(&self) -> f32 {
        self.grid.height_px().max(SCREEN_HEIGHT) + self.tuning.kill_margin
    }

    /// Scatter a burst of debris around `center`
    pub fn spawn_debris(&mut self, center: Vec2, color: u32) {
        for _ in 0..DEBRIS_COUNT {
            let vel = Vec2::new(self.rng.random_range(-2.0..2.0), self.rng.random_range(-4.0..-1.0));
            self.push_particle(Particle {
                pos: center,
                vel,
                color,
                life: DEBRIS_LIFE,
                kind: ParticleKind::Debris,
            });
        }
    }

    /// A coin popping up out of a block
    pub fn spawn_coin_popup(&mut self, pos: Vec2) {
        self.push_particle(Particle {
            pos,
            vel: Vec2::new(0.0, -5.0),
            color: COLOR_COIN,
            life: COIN_POPUP_LIFE,
            kind: ParticleKind::CoinPopup,
        });
    }

    fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }
}

/// Horizontal band `[camera - margin, camera + screen + margin]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityWindow {
    pub min_x: f32,
    pub max_x: f32,
}

impl ActivityWindow {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }
}

pub fn activity_window(camera_x: f32, margin: f32) -> ActivityWindow {
    ActivityWindow {
        min_x: camera_x - margin,
        max_x: camera_x + SCREEN_WIDTH + margin,
    }
}

/// Pull the flag tile out of the grid and derive the finish geometry.
///
/// The flag becomes an entity so it can slide down the pole, so every flag
/// tile is cleared from the grid. Only the first one defines the goal.
fn extract_goal(grid: &mut TileGrid) -> (Option<Entity>, Option<FinishLine>) {
    let flags: Vec<(i32, i32)> = grid.positions_of(Tile::Flag).collect();
    for &(col, row) in &flags {
        grid.set_tile(col, row, Tile::Air);
    }
    let Some(&(col, row)) = flags.first() else {
        return (None, None);
    };

    let pole_x = col as f32 * TILE_SIZE;
    let flag = Entity::new(
        EntityKind::Flag,
        Vec2::new(pole_x + FLAG_OFFSET, row as f32 * TILE_SIZE),
        Vec2::new(POLE_WIDTH, TILE_SIZE),
    );

    let floor_row = (row + 1..grid.height() as i32)
        .find(|&r| grid.is_solid_at(col, r))
        .unwrap_or(SLIDE_FLOOR_FALLBACK_ROW);

    let castle_x = grid
        .positions_of(Tile::Castle)
        .filter(|&(c, _)| c > col)
        .map(|(c, _)| c)
        .min()
        .map(|c| c as f32 * TILE_SIZE + 2.0 * TILE_SIZE)
        .unwrap_or(pole_x + CASTLE_FALLBACK_OFFSET);

    let finish = FinishLine {
        pole_x,
        slide_floor_y: floor_row as f32 * TILE_SIZE,
        castle_x,
    };
    log::debug!("Finish line at col {col}: {finish:?}");
    (Some(flag), Some(finish))
}
