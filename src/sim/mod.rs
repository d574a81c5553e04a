//! Deterministic game simulation
//!
//! Everything in here advances only through [`tick::tick`], and all
//! randomness flows through the `Pcg32` owned by [`GameState`]. Two
//! states built from the same config and seed, fed the same inputs,
//! stay identical tick for tick; the host's frame rate, rendering and
//! audio never feed back into the sim.

pub mod bot;
pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;

pub use bot::BotBrain;
pub use state::{
    Agent, Bomb, Bonus, BonusKind, ControlSource, Fire, GameEvent, GamePhase, GameState, Material,
    RoundOutcome, Tile,
};
pub use tick::{PlayerInput, TickInput, explode_bomb, tick, try_plant_bomb};
