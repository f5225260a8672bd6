//! Level-completion sequencer
//!
//! `None -> Sliding -> WalkingCastle -> Finished`. Once triggered it owns the
//! player outright: no input, gravity or collision runs until the level ends.

use serde::{Deserialize, Serialize};

use super::collision::Body;
use super::entity::{Entity, Facing};
use super::events::{GameEvent, SoundCue};
use super::player::Player;
use crate::consts::SLIDE_EXIT_NUDGE;
use crate::tuning::Tuning;

/// Width of the pole strip that triggers the slide
pub const POLE_WIDTH: f32 = 4.0;
/// Horizontal offset of the flag marker from the pole's left edge
pub const FLAG_OFFSET: f32 = 6.0;
/// Player x relative to the pole while sliding
const POLE_GRIP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CutscenePhase {
    #[default]
    None,
    Sliding,
    WalkingCastle,
    /// Victory signalled; terminal
    Finished,
}

/// Goal geometry derived from the level at load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishLine {
    /// Left edge of the pole strip
    pub pole_x: f32,
    /// Top of the solid tile the slide ends on
    pub slide_floor_y: f32,
    /// Walking past this x ends the level
    pub castle_x: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequencer {
    pub phase: CutscenePhase,
    /// Frames until the victory sting plays
    sting_frames: Option<u32>,
}

impl Sequencer {
    pub fn is_active(&self) -> bool {
        self.phase != CutscenePhase::None
    }

    /// Player box overlaps the flag marker, or the pole strip anywhere below
    /// the flag's top
    pub fn reached_goal(player: &Body, flag: &Entity, finish: &FinishLine) -> bool {
        if player.overlaps(&flag.body) {
            return true;
        }
        player.right() > finish.pole_x
            && player.pos.x < finish.pole_x + POLE_WIDTH
            && player.bottom() > flag.body.pos.y
    }

    /// Start the slide. No-op (returns false) unless idle with a live player.
    pub fn trigger(&mut self, player: &mut Player, finish: &FinishLine, tuning: &Tuning, events: &mut Vec<GameEvent>) -> bool {
        if self.phase != CutscenePhase::None || player.dead {
            return false;
        }
        self.phase = CutscenePhase::Sliding;
        player.body.vel.x = 0.0;
        player.body.vel.y = tuning.slide_speed;
        player.body.pos.x = finish.pole_x + POLE_GRIP;
        player.jumping = false;
        player.spin_jumping = false;
        events.push(GameEvent::Sound(SoundCue::FlagSlide));
        log::info!("Flagpole reached at x={:.0}", finish.pole_x);
        true
    }

    /// Advance the scripted sequence by one tick. A dead player never finishes.
    pub fn update(
        &mut self,
        player: &mut Player,
        flag: Option<&mut Entity>,
        finish: &FinishLine,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        if player.dead {
            return;
        }
        match self.phase {
            CutscenePhase::None | CutscenePhase::Finished => {}
            CutscenePhase::Sliding => {
                if let Some(flag) = flag {
                    let limit = finish.slide_floor_y - flag.body.size.y;
                    if flag.body.pos.y < limit {
                        flag.body.pos.y = (flag.body.pos.y + tuning.slide_speed).min(limit);
                    }
                }

                let limit = finish.slide_floor_y - player.body.size.y;
                if player.body.pos.y < limit {
                    player.body.pos.y = (player.body.pos.y + tuning.slide_speed).min(limit);
                } else {
                    self.phase = CutscenePhase::WalkingCastle;
                    player.body.pos.x += SLIDE_EXIT_NUDGE;
                    player.body.vel = glam::Vec2::ZERO;
                    player.facing = Facing::Right;
                    self.sting_frames = Some(tuning.victory_sting_delay);
                    log::debug!("Slide finished, walking to castle");
                }
            }
            CutscenePhase::WalkingCastle => {
                player.body.pos.x += tuning.castle_walk_speed;
                self.tick_sting(events);

                if player.body.pos.x > finish.castle_x {
                    if self.sting_frames.take().is_some() {
                        events.push(GameEvent::Sound(SoundCue::Victory));
                    }
                    self.phase = CutscenePhase::Finished;
                    events.push(GameEvent::LevelComplete);
                    log::info!("Level complete");
                }
            }
        }
    }

    fn tick_sting(&mut self, events: &mut Vec<GameEvent>) {
        self.sting_frames = match self.sting_frames {
            Some(n) if n <= 1 => {
                events.push(GameEvent::Sound(SoundCue::Victory));
                None
            }
            Some(n) => Some(n - 1),
            None => None,
        };
    }
}
