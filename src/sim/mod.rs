//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `tick` = one frame)
//! - Seeded RNG only, and only for cosmetic particles
//! - Stable iteration order (registry insertion order)
//! - No rendering, audio or platform dependencies; effects leave as events

pub mod collision;
pub mod cutscene;
pub mod entity;
pub mod events;
pub mod grid;
pub mod player;
pub mod state;
pub mod tick;

pub use collision::{Body, Contact, move_x, move_y};
pub use cutscene::{CutscenePhase, FinishLine, Sequencer};
pub use entity::{Behavior, EnemyVariant, Entity, EntityId, EntityKind, EntityRegistry, Facing};
pub use events::{DeathCause, GameEvent, SoundCue};
pub use grid::{BlockHit, Tile, TileGrid};
pub use player::{PowerMode, Player};
pub use state::{Camera, GameState, Particle, ParticleKind};
pub use tick::{TickInput, tick};
