//! Effects emitted by a tick
//!
//! The simulation never calls into the host. Everything observable (score,
//! coins, death, victory, sounds) is queued on the state and drained by the
//! host after the tick completes, so one stomp is exactly one score event.

use serde::{Deserialize, Serialize};

/// Fire-and-forget audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    Bump,
    Break,
    Coin,
    PowerUpAppear,
    PowerUp,
    PowerDown,
    Stomp,
    Kick,
    Fireball,
    FlagSlide,
    Victory,
    Die,
}

impl SoundCue {
    /// Cue name understood by the audio collaborator
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Jump => "jump",
            SoundCue::Bump => "bump",
            SoundCue::Break => "break",
            SoundCue::Coin => "coin",
            SoundCue::PowerUpAppear => "powerup_appear",
            SoundCue::PowerUp => "powerup",
            SoundCue::PowerDown => "powerdown",
            SoundCue::Stomp => "stomp",
            SoundCue::Kick => "kick",
            SoundCue::Fireball => "fireball",
            SoundCue::FlagSlide => "flag_slide",
            SoundCue::Victory => "victory",
            SoundCue::Die => "die",
        }
    }
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Enemy,
    Fell,
    TimeUp,
}

/// One-shot simulation output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Score { points: u32 },
    Coin,
    Sound(SoundCue),
    PlayerDied { cause: DeathCause },
    LevelComplete,
}
