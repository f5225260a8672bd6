//! Property tests for the simulation.
//!
//! Random input sequences are fed through `tick` and the physics invariants
//! are checked after every step.

use glam::Vec2;
use proptest::prelude::*;
use tilebound::consts::TILE_SIZE;
use tilebound::level::LevelData;
use tilebound::sim::player::Damage;
use tilebound::sim::{EntityKind, GameState, Player, PowerMode, Tile, TickInput, tick};
use tilebound::Tuning;

/// Sub-probe penetration the sweeps are allowed to leave behind
const PENETRATION_TOLERANCE: f32 = 0.11;

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (any::<[bool; 7]>()).prop_map(|b| TickInput {
        left: b[0],
        right: b[1],
        jump_held: b[2],
        jump_pressed: b[2] && b[3],
        run_held: b[4],
        run_pressed: b[4] && b[5],
        spin_pressed: b[6],
    })
}

/// 16x15 box: side walls, a two-row floor, and the given interior blocks
fn arena(blocks: &[(usize, usize)]) -> LevelData {
    let mut map = vec![vec![0; 16]; 15];
    for row in map.iter_mut() {
        row[0] = Tile::HardBlock.code();
        row[15] = Tile::HardBlock.code();
    }
    for row in map.iter_mut().skip(13) {
        row.fill(Tile::Ground.code());
    }
    for &(col, row) in blocks {
        map[row][col] = Tile::Brick.code();
    }
    LevelData::from_map(map)
}

/// Deepest overlap between the player box and any solid tile, measured as the
/// smaller of the two axis depths
fn worst_penetration(state: &GameState) -> f32 {
    let body = &state.player.body;
    let mut worst = 0.0f32;
    for row in 0..state.grid.height() as i32 {
        for col in 0..state.grid.width() as i32 {
            if !state.grid.is_solid_at(col, row) {
                continue;
            }
            let tile = Vec2::new(col as f32, row as f32) * TILE_SIZE;
            let dx = body.right().min(tile.x + TILE_SIZE) - body.pos.x.max(tile.x);
            let dy = body.bottom().min(tile.y + TILE_SIZE) - body.pos.y.max(tile.y);
            if dx > 0.0 && dy > 0.0 {
                worst = worst.max(dx.min(dy));
            }
        }
    }
    worst
}

fn block_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((2..14usize, 5..13usize), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn player_never_sinks_into_solid_tiles(
        blocks in block_strategy(),
        inputs in prop::collection::vec(input_strategy(), 1..300),
    ) {
        let mut state = GameState::new(&arena(&blocks), Tuning::default());
        prop_assert!(worst_penetration(&state) <= PENETRATION_TOLERANCE);

        for input in &inputs {
            tick(&mut state, input);
            if state.player.dead {
                break;
            }
            prop_assert!(
                worst_penetration(&state) <= PENETRATION_TOLERANCE,
                "player at {:?} overlaps a solid tile",
                state.player.body.pos
            );
        }
    }

    #[test]
    fn grounded_implies_no_vertical_velocity(
        blocks in block_strategy(),
        inputs in prop::collection::vec(input_strategy(), 1..300),
    ) {
        let mut state = GameState::new(&arena(&blocks), Tuning::default());
        for input in &inputs {
            tick(&mut state, input);
            if state.player.body.grounded {
                prop_assert_eq!(state.player.body.vel.y, 0.0);
            }
        }
    }

    #[test]
    fn fireballs_never_exceed_cap(inputs in prop::collection::vec(input_strategy(), 1..400)) {
        let mut state = GameState::new(&arena(&[]), Tuning::default());
        state.player.set_power(PowerMode::Fire);
        let cap = state.tuning.max_fireballs;

        for input in &inputs {
            tick(&mut state, input);
            prop_assert!(state.entities.count_alive(EntityKind::Fireball) <= cap);
        }
    }

    #[test]
    fn power_mode_follows_upgrade_path(ops in prop::collection::vec(any::<bool>(), 1..50)) {
        let mut player = Player::new(Vec2::new(50.0, 192.0));
        let bottom = player.body.bottom();

        for power_up in ops {
            let before = player.power;
            if power_up {
                player.power_up();
                prop_assert!(player.power >= before);
                prop_assert!(player.power != PowerMode::Small);
            } else {
                player.invulnerable = 0;
                let damage = player.damage(120);
                match before {
                    PowerMode::Small => {
                        prop_assert_eq!(damage, Damage::Fatal);
                        prop_assert_eq!(player.power, PowerMode::Small);
                    }
                    PowerMode::Big | PowerMode::Fire => {
                        prop_assert_eq!(damage, Damage::PoweredDown);
                        prop_assert_eq!(player.power, PowerMode::Small);
                    }
                }
            }
            prop_assert_eq!(player.body.size.y, player.power.height());
            prop_assert_eq!(player.body.bottom(), bottom);
        }
    }
}
