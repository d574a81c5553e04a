//! Game configuration
//!
//! Everything the host can tune without touching simulation code.
//! Loaded from JSON when available, otherwise defaults.

use serde::{Deserialize, Serialize};

/// Bot decision tuning. The probabilities are named so tests can pin
/// them to 0.0 or 1.0 and assert which branch the bot takes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BotConfig {
    /// Upper bound (ticks) for the random startup delay that
    /// desynchronizes bots at round start
    pub start_delay_max_ticks: u32,
    /// Chance to plant when an enemy is on an adjacent cell
    pub aggression_chance: f64,
    /// Chance to restrict target choice to safe cells when any exist
    pub safe_target_bias: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            start_delay_max_ticks: 60,
            aggression_chance: 0.5,
            safe_target_bias: 0.7,
        }
    }
}

/// Round setup parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid width in tiles
    pub tiles_x: i32,
    /// Grid height in tiles
    pub tiles_y: i32,
    /// Frames-per-second hint from the host tick source; converts
    /// second-based timers into tick counts
    pub fps: f32,
    /// Human-controlled agents (1-2)
    pub players: u32,
    /// Autonomous agents (0-4)
    pub bots: u32,
    /// Percentage of wood tiles hiding a bonus
    pub bonuses_percent: u32,
    /// Seconds from planting a bomb to detonation
    pub bomb_timer_secs: f32,
    /// Bot decision tuning
    pub bot: BotConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tiles_x: 17,
            tiles_y: 13,
            fps: 50.0,
            players: 1,
            bots: 2,
            bonuses_percent: 16,
            bomb_timer_secs: 2.0,
            bot: BotConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load from a JSON file, falling back to defaults on any failure.
    /// A broken config file should never stop a round from starting.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {path}");
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {path}: {e}; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config at {path}; using defaults");
                Self::default()
            }
        }
    }

    /// Clamp counts to supported ranges (1-2 players, 0-4 bots)
    pub fn sanitized(mut self) -> Self {
        self.players = self.players.clamp(1, 2);
        self.bots = self.bots.min(4);
        self.tiles_x = self.tiles_x.max(5);
        self.tiles_y = self.tiles_y.max(5);
        self.bonuses_percent = self.bonuses_percent.min(100);
        self
    }
}
