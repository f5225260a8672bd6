//! Fixed-step simulation tick
//!
//! One call advances the world by one frame in a fixed order: player control
//! and movement, entity AI and physics, contact resolution, compaction, then
//! camera and particles. Same state + same input always yields the same
//! result.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, Contact, move_x, move_y, resolve_entity};
use super::entity::{Behavior, Entity, EntityKind};
use super::events::{DeathCause, GameEvent, SoundCue};
use super::grid::{BlockHit, Tile};
use super::player::{Damage, PowerMode};
use super::state::{GameState, activity_window};
use crate::consts::*;

/// Player intent for one tick. `*_pressed` fields are edge-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump_held: bool,
    /// Jump went down since the previous tick
    pub jump_pressed: bool,
    /// Run/shoot button held
    pub run_held: bool,
    /// Run/shoot went down since the previous tick (fires in fire mode)
    pub run_pressed: bool,
    /// Spin jump went down since the previous tick
    pub spin_pressed: bool,
}

impl TickInput {
    /// Same held state with every edge cleared, for follow-up substeps
    pub fn without_presses(&self) -> Self {
        Self {
            jump_pressed: false,
            run_pressed: false,
            spin_pressed: false,
            ..*self
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.player.invulnerable > 0 {
        state.player.invulnerable -= 1;
    }

    if state.cutscene.is_active() {
        if let Some(finish) = state.finish {
            state.cutscene.update(
                &mut state.player,
                state.flag.as_mut(),
                &finish,
                &state.tuning,
                &mut state.events,
            );
        }
    } else {
        update_player(state, input);
        update_entities(state);
        resolve_contacts(state);
        state.entities.compact();
    }

    update_camera(state);
    update_particles(state);
    state.frame += 1;
}

fn update_player(state: &mut GameState, input: &TickInput) {
    if state.player.dead {
        state.player.fall_dead(state.tuning.gravity);
        return;
    }

    let outcome = state.player.apply_input(input, &state.tuning);
    if outcome.jumped {
        state.sound(SoundCue::Jump);
    }
    if outcome.wants_fireball {
        try_shoot(state);
    }

    move_x(&mut state.player.body, &state.grid);
    match move_y(&mut state.player.body, &state.grid) {
        Some(Contact::Floor { .. }) => state.player.land(),
        Some(Contact::Ceiling { row, first, last }) => {
            state.sound(SoundCue::Bump);
            for col in first..=last {
                hit_block(state, col, row);
            }
        }
        _ => {}
    }

    collect_coins(state);
    check_goal(state);

    if !state.cutscene.is_active() && state.player.body.pos.y > state.kill_y() {
        state.kill_player(DeathCause::Fell);
    }
}

/// Spawn a fireball unless the on-screen cap is reached
fn try_shoot(state: &mut GameState) {
    if state.entities.count_alive(EntityKind::Fireball) >= state.tuning.max_fireballs {
        log::trace!("Fireball cap reached");
        return;
    }
    let ball = state.player.fireball(&state.tuning);
    state.entities.spawn(ball);
    state.sound(SoundCue::Fireball);
}

/// Apply a head-bump to one block and emit its effects
fn hit_block(state: &mut GameState, col: i32, row: i32) {
    let can_break = state.player.power.can_break_bricks();
    let tile_pos = Vec2::new(col as f32, row as f32) * TILE_SIZE;

    match state.grid.hit_from_below(col, row, can_break) {
        BlockHit::Inert | BlockHit::Bumped => {}
        BlockHit::Broken => {
            state.emit(GameEvent::Score { points: SCORE_BRICK });
            state.sound(SoundCue::Break);
            state.spawn_debris(tile_pos + Vec2::splat(TILE_SIZE * 0.5), COLOR_BRICK);
        }
        BlockHit::CoinReleased => {
            state.emit(GameEvent::Coin);
            state.emit(GameEvent::Score { points: SCORE_BLOCK_COIN });
            state.sound(SoundCue::Coin);
            state.spawn_coin_popup(tile_pos + Vec2::new(4.0, -TILE_SIZE));
        }
        BlockHit::PowerUpReleased => {
            let kind = match state.player.power {
                PowerMode::Small => EntityKind::Mushroom,
                PowerMode::Big | PowerMode::Fire => EntityKind::FireFlower,
            };
            let mut item = Entity::new(kind, tile_pos, Vec2::splat(TILE_SIZE));
            item.behavior = Behavior::Spawning {
                frames_left: state.tuning.powerup_spawn_frames,
            };
            let id = state.entities.spawn(item);
            state.sound(SoundCue::PowerUpAppear);
            log::debug!("Released {kind:?} (id {id}) from block ({col}, {row})");
        }
    }
}

/// Pick up every coin tile the player box overlaps
fn collect_coins(state: &mut GameState) {
    let (c0, c1) = state.player.body.cols();
    let (r0, r1) = state.player.body.rows();
    for row in r0..=r1 {
        for col in c0..=c1 {
            if state.grid.tile(col, row) == Some(Tile::Coin) {
                state.grid.set_tile(col, row, Tile::Air);
                state.emit(GameEvent::Coin);
                state.emit(GameEvent::Score { points: SCORE_COIN_TILE });
                state.sound(SoundCue::Coin);
            }
        }
    }
}

fn check_goal(state: &mut GameState) {
    let (Some(flag), Some(finish)) = (state.flag.as_ref(), state.finish) else {
        return;
    };
    if super::cutscene::Sequencer::reached_goal(&state.player.body, flag, &finish) {
        state
            .cutscene
            .trigger(&mut state.player, &finish, &state.tuning, &mut state.events);
    }
}

fn update_entities(state: &mut GameState) {
    let window = activity_window(state.camera.x, state.tuning.activity_margin);
    let kill_y = state.kill_y();
    let tuning = &state.tuning;
    let grid = &state.grid;
    let mut bursts = Vec::new();

    for entity in state.entities.slots_mut().iter_mut().filter(|e| !e.dead) {
        if let Behavior::Spawning { frames_left } = &mut entity.behavior {
            entity.body.pos.y -= tuning.powerup_rise_speed;
            *frames_left = frames_left.saturating_sub(1);
            if *frames_left == 0 {
                entity.behavior = Behavior::Active;
                if entity.kind == EntityKind::Mushroom {
                    entity.body.vel.x = entity.facing.sign() * tuning.mushroom_speed;
                }
            }
            continue;
        }

        // Off-screen actors are frozen; stray projectiles are discarded
        if !window.contains(entity.body.pos.x) {
            if entity.kind == EntityKind::Fireball {
                entity.dead = true;
            }
            continue;
        }

        match entity.kind {
            EntityKind::FireFlower | EntityKind::Flag => {}
            kind => {
                let vel = &mut entity.body.vel;
                vel.y = (vel.y + tuning.gravity).min(tuning.max_fall_speed);
                match kind {
                    EntityKind::GroundEnemy(_) => vel.x = entity.facing.sign() * tuning.enemy_speed,
                    EntityKind::Mushroom => vel.x = entity.facing.sign() * tuning.mushroom_speed,
                    _ => {}
                }
                if resolve_entity(entity, grid, tuning.fireball_bounce).destroyed {
                    bursts.push(entity.body.center());
                }
            }
        }

        if entity.body.pos.y > kill_y {
            entity.dead = true;
        }
    }

    for pos in bursts {
        state.spawn_debris(pos, COLOR_FIRE);
    }
}

/// Stomp: falling, with the feet above the enemy's midline (plus tolerance)
fn is_stomp(player: &Body, enemy: &Body, tolerance: f32) -> bool {
    player.vel.y > 0.0 && player.bottom() < enemy.pos.y + enemy.size.y * 0.5 + tolerance
}

/// Projectile-vs-enemy, then player-vs-everything
fn resolve_contacts(state: &mut GameState) {
    let window = activity_window(state.camera.x, state.tuning.activity_margin);
    // The slide may have started earlier this tick; the sequencer owns the player
    let player_free = !state.player.dead && !state.cutscene.is_active();
    let tuning = &state.tuning;
    let events = &mut state.events;
    let player = &mut state.player;
    let slots = state.entities.slots_mut();
    let mut bursts: Vec<(Vec2, u32)> = Vec::new();
    let mut fatal = false;

    for i in 0..slots.len() {
        if slots[i].dead || slots[i].kind != EntityKind::Fireball {
            continue;
        }
        let hit = (0..slots.len()).find(|&j| {
            let target = &slots[j];
            !target.dead
                && target.kind.is_enemy()
                && !target.is_spawning()
                && slots[i].body.overlaps(&target.body)
        });
        if let Some(j) = hit {
            slots[i].dead = true;
            slots[j].dead = true;
            events.push(GameEvent::Sound(SoundCue::Kick));
            events.push(GameEvent::Score { points: SCORE_KILL });
            bursts.push((slots[j].body.center(), COLOR_GOOMBA));
            bursts.push((slots[i].body.center(), COLOR_FIRE));
        }
    }

    if player_free {
        for entity in slots.iter_mut() {
            if entity.dead
                || entity.is_spawning()
                || !window.contains(entity.body.pos.x)
                || !player.body.overlaps(&entity.body)
            {
                continue;
            }

            match entity.kind {
                EntityKind::GroundEnemy(_) => {
                    // A stomp earlier this tick leaves vy negative, so a second
                    // overlapping enemy counts as side contact
                    if is_stomp(&player.body, &entity.body, tuning.stomp_tolerance) {
                        entity.dead = true;
                        player.body.vel.y = if player.spin_jumping {
                            -tuning.spin_bounce_force
                        } else {
                            -tuning.bounce_force
                        };
                        events.push(GameEvent::Sound(SoundCue::Stomp));
                        events.push(GameEvent::Score { points: SCORE_KILL });
                        bursts.push((entity.body.center(), COLOR_GOOMBA));
                        continue;
                    }
                    match player.damage(tuning.invulnerability_frames) {
                        Damage::Ignored => {}
                        Damage::PoweredDown => {
                            events.push(GameEvent::Sound(SoundCue::PowerDown));
                            log::debug!("Player powered down by enemy {}", entity.id);
                        }
                        Damage::Fatal => {
                            fatal = true;
                            break;
                        }
                    }
                }
                EntityKind::Mushroom | EntityKind::FireFlower => {
                    entity.dead = true;
                    player.power_up();
                    events.push(GameEvent::Sound(SoundCue::PowerUp));
                    events.push(GameEvent::Score { points: SCORE_POWERUP });
                    log::debug!("Picked up {:?}, now {:?}", entity.kind, player.power);
                }
                EntityKind::Fireball | EntityKind::Flag => {}
            }
        }
    }

    if fatal {
        state.kill_player(DeathCause::Enemy);
    }
    for (pos, color) in bursts {
        state.spawn_debris(pos, color);
    }
}

fn update_camera(state: &mut GameState) {
    let body = &state.player.body;
    let target = body.pos.x + body.size.x * 0.5 - SCREEN_WIDTH * 0.5;
    let max_x = (state.grid.width_px() - SCREEN_WIDTH).max(0.0);
    state.camera.follow(target, max_x);

    // The screen's left edge is a wall
    let player = &mut state.player;
    if !player.dead && !state.cutscene.is_active() && player.body.pos.x < state.camera.x {
        player.body.pos.x = state.camera.x;
        player.body.vel.x = 0.0;
    }
}

fn update_particles(state: &mut GameState) {
    let gravity = state.tuning.gravity;
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.vel.y += gravity;
        p.life = p.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}
