//! Bot decision state machine
//!
//! Bots are ordinary agents driven by a small greedy heuristic instead
//! of host input: walk cell to cell, plant when next to wood or an
//! enemy, hide while the own bomb is live, and prefer cells outside
//! every bomb's blast footprint. All probabilities come from
//! `BotConfig` so tests can pin them.

use glam::{IVec2, Vec2};
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::open_neighbors;
use super::state::{GameState, Material};
use crate::settings::BotConfig;
use crate::{CARDINALS, to_pixel};

/// Per-bot decision state. The bot is always in one of four implicit
/// states: delaying at spawn, deciding at its target cell, moving
/// toward the target, or waiting out a hazard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotBrain {
    /// Unit cardinal toward the current target
    pub dir: IVec2,
    /// Cell the bot is heading to
    pub target: IVec2,
    /// Pixel position of the target cell; arrival is exact equality,
    /// which movement guarantees by clamping the final step
    pub target_pixel: Vec2,
    /// Startup delay so bots don't all act on the same tick
    pub start_ticks_left: u32,
    pub started: bool,
    /// Holding still this tick (startup delay or hiding from a bomb)
    pub waiting: bool,
}

impl BotBrain {
    pub fn new(rng: &mut Pcg32, config: &BotConfig, position: IVec2) -> Self {
        Self {
            dir: IVec2::new(0, -1),
            target: position,
            target_pixel: to_pixel(position),
            start_ticks_left: rng.random_range(0..=config.start_delay_max_ticks),
            started: false,
            waiting: false,
        }
    }
}

/// Whether any cardinal neighbor is wood worth burning
pub fn near_wood(state: &GameState, position: IVec2) -> bool {
    CARDINALS
        .iter()
        .any(|&dir| state.material_at(position + dir) == Material::Wood)
}

/// Whether a live player stands on an adjacent cell and the aggression
/// roll comes up. The roll happens regardless so the RNG stream does
/// not depend on player positions.
pub fn wants_kill(state: &mut GameState, position: IVec2) -> bool {
    let near = CARDINALS.iter().any(|&dir| {
        let cell = position + dir;
        state
            .players
            .iter()
            .any(|p| p.alive && p.position == cell)
    });
    let angry = state.rng.random_bool(state.config.bot.aggression_chance);
    near && angry
}

/// Pick the next target cell among the open neighbors. With
/// `safe_target_bias` probability the choice is restricted to cells
/// outside every live bomb's blast footprint; only then, and only when
/// the chosen pool still has alternatives, the cell we came from is
/// dropped. Retreating back the way we came stays legal whenever it is
/// the lone safe option. No candidates means the bot stalls in place
/// until something opens up (fire clearing wood, a bomb expiring).
pub fn find_target(state: &mut GameState, brain: &mut BotBrain, position: IVec2) {
    let targets = open_neighbors(state, position);

    let safe: Vec<IVec2> = targets
        .iter()
        .copied()
        .filter(|&t| state.is_safe_cell(t))
        .collect();

    let lucky = state.rng.random_bool(state.config.bot.safe_target_bias);
    let mut pool = if !safe.is_empty() && lucky { safe } else { targets };

    if pool.len() > 1 {
        let previous = position - brain.dir;
        pool.retain(|&t| t != previous);
    }
    if pool.is_empty() {
        return;
    }

    let pick = pool[state.rng.random_range(0..pool.len())];
    brain.dir = pick - position;
    brain.target = pick;
    brain.target_pixel = to_pixel(pick);
}
