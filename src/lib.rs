//! Grid Blast - a bomb-arena game simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, agents, bombs, fire, bots)
//! - `settings`: Data-driven game configuration
//!
//! Rendering, audio and input capture live in the host application; the
//! core consumes per-tick input intents and emits discrete events.

pub mod settings;
pub mod sim;

pub use settings::{BotConfig, GameConfig};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 32.0;
    /// Agent bounding box edge length in pixels
    pub const AGENT_SIZE: f32 = 48.0;

    /// Seconds a fire cell stays lethal after an explosion
    pub const FIRE_DURATION_SECS: f32 = 0.3;

    /// Base agent movement speed (pixels per tick)
    pub const BASE_VELOCITY: f32 = 2.0;
    /// Velocity gained from a speed bonus
    pub const SPEED_BONUS: f32 = 0.8;

    /// Tile collision boxes are inset so agents can slip past edges
    /// instead of snagging on them mid-corridor.
    pub const TILE_INSET_X: f32 = 25.0;
    pub const TILE_INSET_Y: f32 = 20.0;
    pub const TILE_SHRINK: f32 = 30.0;
    /// Max pixel distance from a diagonal cell for the corner-fix nudge
    pub const CORNER_EDGE_SIZE: f32 = 30.0;

    /// Ticks a dead agent holds full opacity before fading
    pub const FADE_DELAY_TICKS: u32 = 30;
    /// Opacity lost per tick once the fade starts
    pub const FADE_STEP: f32 = 0.05;
}

/// Convert a grid cell to its pixel position (cell origin)
#[inline]
pub fn to_pixel(cell: IVec2) -> Vec2 {
    cell.as_vec2() * consts::TILE_SIZE
}

/// Convert a pixel position to the grid cell it occupies (nearest cell)
#[inline]
pub fn to_grid(pixel: Vec2) -> IVec2 {
    (pixel / consts::TILE_SIZE).round().as_ivec2()
}

/// The four cardinal direction vectors, in the fixed scan order
/// (right, left, down, up) used by propagation and bot lookarounds.
pub const CARDINALS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];
