//! Headless demo runner: plays one round with an idle player and
//! autonomous bots, logging events as they happen. Useful for watching
//! a seed play out and for profiling the sim without a host.

use std::time::{SystemTime, UNIX_EPOCH};

use grid_blast::settings::GameConfig;
use grid_blast::sim::{GameState, RoundOutcome, TickInput, tick};

const MAX_TICKS: u64 = 60_000;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

    let config = GameConfig::load("grid-blast.json");
    log::info!(
        "Starting round: seed {seed}, {}x{} tiles, {} player(s), {} bot(s)",
        config.tiles_x,
        config.tiles_y,
        config.players,
        config.bots
    );

    let mut state = GameState::new(config, seed);
    let input = TickInput::default();

    while state.outcome.is_none() && state.time_ticks < MAX_TICKS {
        tick(&mut state, &input);
        for event in state.drain_events() {
            log::info!("[{:>6}] {event:?}", state.time_ticks);
        }
    }

    match state.outcome {
        Some(RoundOutcome::Won { player }) => {
            println!("Player {player} won after {} ticks", state.time_ticks);
        }
        Some(RoundOutcome::Lost) => {
            println!("Round lost after {} ticks", state.time_ticks);
        }
        None => {
            println!("No outcome after {MAX_TICKS} ticks");
        }
    }
}
