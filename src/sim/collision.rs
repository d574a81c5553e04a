//! Collision detection for agents moving through the grid
//!
//! Agents move in continuous pixel space but the things they collide
//! with (walls, wood, bombs) live on grid cells, so every query here
//! bridges the two: bounding boxes for terrain, cell coincidence for
//! bombs and fire.

use glam::{IVec2, Vec2};

use super::state::{GameState, Material, Tile};
use crate::consts::*;
use crate::{CARDINALS, to_grid, to_pixel};

/// Axis-aligned pixel-space bounding box
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Whether two rectangles intersect (touching counts)
#[inline]
pub fn intersect(a: &Rect, b: &Rect) -> bool {
    a.left <= b.right && b.left <= a.right && a.top <= b.bottom && b.top <= a.bottom
}

/// An agent's bounding box at the given pixel position
pub fn agent_rect(pixel: Vec2) -> Rect {
    Rect {
        left: pixel.x,
        top: pixel.y,
        right: pixel.x + AGENT_SIZE,
        bottom: pixel.y + AGENT_SIZE,
    }
}

/// A tile's collision box, inset so agents slip past cell edges
/// instead of snagging on them
pub fn tile_rect(position: IVec2) -> Rect {
    let left = position.x as f32 * TILE_SIZE + TILE_INSET_X;
    let top = position.y as f32 * TILE_SIZE + TILE_INSET_Y;
    Rect {
        left,
        top,
        right: left + TILE_SIZE - TILE_SHRINK,
        bottom: top + TILE_SIZE - TILE_SHRINK,
    }
}

/// True when an agent at `pixel` would overlap any recorded tile.
/// Walls and wood both block; grass is never recorded.
pub fn hits_terrain(pixel: Vec2, tiles: &[Tile]) -> bool {
    let agent = agent_rect(pixel);
    tiles
        .iter()
        .any(|tile| intersect(&agent, &tile_rect(tile.position)))
}

/// True when moving to `candidate` would put the agent on a bomb cell.
/// The agent's recorded escape bomb (the one planted under its feet)
/// is exempt so it can walk off.
pub fn hits_bomb(state: &GameState, escape_bomb: Option<u32>, candidate: Vec2) -> bool {
    let cell = to_grid(candidate);
    match state.bomb_at(cell) {
        Some(bomb) => Some(bomb.id) != escape_bomb,
        None => false,
    }
}

/// When terrain rejects a move along one axis, look for a passable
/// diagonal cell the agent is nearly aligned with and return its pixel
/// position; the mover nudges perpendicular toward it so agents round
/// corners instead of sticking to them.
///
/// `dir` is the unit cardinal the agent is trying to move in.
pub fn corner_fix(state: &GameState, position: IVec2, pixel: Vec2, dir: IVec2) -> Option<Vec2> {
    let perpendicular = IVec2::new(dir.y, dir.x);
    let side1 = position + perpendicular;
    let side2 = position - perpendicular;

    let grass = |cell: IVec2| state.material_at(cell) == Material::Grass;
    let near = |cell: IVec2| {
        let px = to_pixel(cell);
        (pixel.x - px.x).abs() < CORNER_EDGE_SIZE && (pixel.y - px.y).abs() < CORNER_EDGE_SIZE
    };

    // Straight ahead is open; re-center on the current cell
    let fix = if grass(position + dir) {
        Some(position)
    } else if grass(side1) && near(side1) && grass(side1 + dir) {
        Some(side1)
    } else if grass(side2) && near(side2) && grass(side2 + dir) {
        Some(side2)
    } else {
        None
    };

    fix.filter(|&cell| grass(cell)).map(to_pixel)
}

/// Grass-passable, bomb-free neighbors of a cell; the candidate set
/// for bot target selection
pub fn open_neighbors(state: &GameState, position: IVec2) -> Vec<IVec2> {
    CARDINALS
        .iter()
        .map(|&dir| position + dir)
        .filter(|&cell| state.material_at(cell) == Material::Grass && !state.has_bomb(cell))
        .collect()
}
