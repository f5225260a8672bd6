//! Tilebound headless runner
//!
//! Plays a level with a scripted input pattern and logs what happened.
//!
//! Usage: `tilebound [level.json] [tuning.json]`
//! With no level the built-in 1-1 course is used. `RUST_LOG=debug` shows
//! every simulation event.

use std::process::ExitCode;

use tilebound::consts::SIM_DT;
use tilebound::input::KeyState;
use tilebound::level::{LevelData, default_level};
use tilebound::sim::GameEvent;
use tilebound::{GameStatus, LoadError, Session, Tuning};

/// Simulated seconds before the runner gives up
const MAX_RUN_SECONDS: u32 = 300;
/// Ticks between scripted jump taps
const JUMP_PERIOD: u64 = 45;

fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn load_inputs() -> Result<(LevelData, Tuning, String), LoadError> {
    let mut args = std::env::args().skip(1);
    let (level, world) = match args.next() {
        Some(path) => {
            let world = std::path::Path::new(&path)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "custom".to_string());
            (LevelData::load(&path)?, world)
        }
        None => (default_level(), "1-1".to_string()),
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path)?,
        None => Tuning::default(),
    };
    Ok((level, tuning, world))
}

fn main() -> ExitCode {
    init_logging();

    let (level, tuning, world) = match load_inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::new(tuning);
    session.start(level, &world);

    // Run right and keep hopping
    let mut keys = KeyState::new();
    keys.press("ArrowRight");
    keys.press("ShiftLeft");

    let max_frames = u64::from(MAX_RUN_SECONDS) * 60;
    let mut frame = 0u64;
    while frame < max_frames
        && matches!(session.status(), GameStatus::Playing | GameStatus::Dying)
    {
        if frame % JUMP_PERIOD == 0 {
            keys.press("Space");
        } else if frame % JUMP_PERIOD == JUMP_PERIOD / 2 {
            keys.release("Space");
        }

        let input = keys.snapshot();
        for event in session.frame(SIM_DT, &input) {
            match event {
                GameEvent::Sound(cue) => log::trace!("sound {}", cue.name()),
                GameEvent::PlayerDied { cause } => log::info!("Died: {cause:?}"),
                other => log::debug!("{other:?}"),
            }
        }
        frame += 1;
    }

    let stats = session.stats();
    let x = session.state().map_or(0.0, |s| s.player.body.pos.x);
    log::info!(
        "Finished {:?} on {} after {} frames: score {}, coins {}, lives {}, time {}, x={x:.0}",
        session.status(),
        stats.world,
        frame,
        stats.score,
        stats.coins,
        stats.lives,
        stats.time,
    );
    ExitCode::SUCCESS
}
