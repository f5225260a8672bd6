//! Player controller and power-mode state machine
//!
//! Power modes form an ordered path `Small -> Big -> Fire`. Pickups move one
//! step up, damage drops any powered mode straight to `Small`, and damage
//! while `Small` is death.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Body;
use super::entity::{Entity, EntityKind, Facing};
use super::tick::TickInput;
use crate::consts::{BIG_HEIGHT, FIREBALL_SIZE, PLAYER_WIDTH, SMALL_HEIGHT, STOP_THRESHOLD};
use crate::tuning::Tuning;

/// Player upgrade tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PowerMode {
    #[default]
    Small,
    Big,
    Fire,
}

impl PowerMode {
    /// One step up the upgrade path (Fire is the ceiling)
    pub fn upgraded(self) -> Self {
        match self {
            PowerMode::Small => PowerMode::Big,
            PowerMode::Big | PowerMode::Fire => PowerMode::Fire,
        }
    }

    /// Collision box height for this mode
    pub fn height(self) -> f32 {
        match self {
            PowerMode::Small => SMALL_HEIGHT,
            PowerMode::Big | PowerMode::Fire => BIG_HEIGHT,
        }
    }

    pub fn can_break_bricks(self) -> bool {
        self != PowerMode::Small
    }
}

/// Result of the player taking a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Invulnerable or contact-immune
    Ignored,
    /// Dropped to small and became invulnerable
    PoweredDown,
    /// Was small; the caller must kill the player
    Fatal,
}

/// What the controller did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub jumped: bool,
    /// Fresh shoot press while in fire mode (cap is checked by the caller)
    pub wants_fireball: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    pub power: PowerMode,
    pub jumping: bool,
    /// Spin jump in progress: contact-immune, different stomp bounce
    pub spin_jumping: bool,
    /// Frames of damage immunity left (sprite blinks while > 0)
    pub invulnerable: u32,
    pub dead: bool,
    /// Jump input state last tick, for release detection
    jump_was_held: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, SMALL_HEIGHT)),
            facing: Facing::Right,
            power: PowerMode::Small,
            jumping: false,
            spin_jumping: false,
            invulnerable: 0,
            dead: false,
            jump_was_held: false,
        }
    }

    /// Switch power mode, resizing the box while keeping the feet in place
    pub fn set_power(&mut self, mode: PowerMode) {
        let delta = mode.height() - self.body.size.y;
        self.body.size.y = mode.height();
        self.body.pos.y -= delta;
        self.power = mode;
    }

    /// Pickup collected: one step up, never down
    pub fn power_up(&mut self) {
        self.set_power(self.power.upgraded());
    }

    /// Contact damage
    pub fn damage(&mut self, invulnerability_frames: u32) -> Damage {
        if self.invulnerable > 0 || self.spin_jumping || self.dead {
            return Damage::Ignored;
        }
        match self.power {
            PowerMode::Small => Damage::Fatal,
            PowerMode::Big | PowerMode::Fire => {
                self.set_power(PowerMode::Small);
                self.invulnerable = invulnerability_frames;
                Damage::PoweredDown
            }
        }
    }

    /// Blink phase for renderers
    pub fn is_blinking_hidden(&self, frame: u64) -> bool {
        self.invulnerable > 0 && frame % 4 < 2
    }

    /// Translate input into velocity changes for one tick (before movement).
    ///
    /// Order: horizontal acceleration or friction, jump-release cut, gravity,
    /// then a fresh jump press overrides vertical velocity outright.
    pub fn apply_input(&mut self, input: &TickInput, tuning: &Tuning) -> ControlOutcome {
        let mut outcome = ControlOutcome::default();
        let vel = &mut self.body.vel;
        let target = tuning.target_speed(input.run_held);

        if input.left {
            vel.x = (vel.x - tuning.acceleration).max(-target);
            self.facing = Facing::Left;
        } else if input.right {
            vel.x = (vel.x + tuning.acceleration).min(target);
            self.facing = Facing::Right;
        } else {
            vel.x *= tuning.friction;
            if vel.x.abs() < STOP_THRESHOLD {
                vel.x = 0.0;
            }
        }

        // Variable jump height: releasing early caps the ascent
        if self.jump_was_held && !input.jump_held && vel.y < -tuning.jump_cut_speed {
            vel.y = -tuning.jump_cut_speed;
        }
        self.jump_was_held = input.jump_held;

        vel.y = (vel.y + tuning.gravity).min(tuning.max_fall_speed);

        let spin = input.spin_pressed;
        if (input.jump_pressed || spin) && self.body.grounded {
            vel.y = -tuning.jump_force;
            self.body.grounded = false;
            self.jumping = true;
            self.spin_jumping = spin;
            outcome.jumped = true;

            // Pressed and released between snapshots: cut straight away
            if input.jump_pressed && !input.jump_held && !spin {
                vel.y = vel.y.max(-tuning.jump_cut_speed);
            }
        }

        outcome.wants_fireball = input.run_pressed && self.power == PowerMode::Fire;
        outcome
    }

    /// Landing clears the jump flags
    pub fn land(&mut self) {
        self.jumping = false;
        self.spin_jumping = false;
    }

    /// Build a projectile in front of the player
    pub fn fireball(&self, tuning: &Tuning) -> Entity {
        let offset = match self.facing {
            Facing::Right => self.body.size.x,
            Facing::Left => -FIREBALL_SIZE * 0.5,
        };
        let pos = self.body.pos + Vec2::new(offset, 8.0);
        let mut ball = Entity::new(EntityKind::Fireball, pos, Vec2::splat(FIREBALL_SIZE));
        ball.facing = self.facing;
        ball.body.vel = Vec2::new(self.facing.sign() * tuning.fireball_speed, tuning.fireball_drop);
        ball
    }

    /// Begin the death animation: a small hop, then free fall
    pub fn start_death(&mut self, hop: f32) {
        self.dead = true;
        self.body.vel = Vec2::new(0.0, -hop);
        self.body.grounded = false;
    }

    /// Dead bodies ignore the grid
    pub fn fall_dead(&mut self, gravity: f32) {
        self.body.pos.y += self.body.vel.y;
        self.body.vel.y += gravity;
    }
}
