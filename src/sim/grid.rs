//! Map generation and bonus distribution
//!
//! The wall/wood layout is fully deterministic from the grid dimensions;
//! only bonus placement consumes randomness.

use glam::IVec2;
use rand::seq::SliceRandom;

use super::state::{Bonus, BonusKind, GameState, Material, Tile};

/// Lay out the round's terrain: a wall border, an inner checkerboard of
/// walls at even (x, y), and wood on every remaining cell outside the
/// four 3x3 corner spawn zones. Grass cells are not recorded.
pub fn generate_map(state: &mut GameState) {
    let (tx, ty) = (state.config.tiles_x, state.config.tiles_y);
    state.tiles.clear();

    for y in 0..ty {
        for x in 0..tx {
            let border = x == 0 || y == 0 || x == tx - 1 || y == ty - 1;
            if border || (x % 2 == 0 && y % 2 == 0) {
                state.tiles.push(Tile {
                    material: Material::Wall,
                    position: IVec2::new(x, y),
                });
            } else if !in_spawn_zone(x, y, tx, ty) {
                state.tiles.push(Tile {
                    material: Material::Wood,
                    position: IVec2::new(x, y),
                });
            }
        }
    }

    log::info!(
        "Generated {}x{} map, {} tiles recorded",
        tx,
        ty,
        state.tiles.len()
    );
}

/// Corner 3x3 zones stay clear of wood so agents can spawn and move
fn in_spawn_zone(x: i32, y: i32, tx: i32, ty: i32) -> bool {
    let near_left = x <= 2;
    let near_right = x >= tx - 3;
    let near_top = y <= 2;
    let near_bottom = y >= ty - 3;
    (near_top || near_bottom) && (near_left || near_right)
}

/// Hide bonuses under a percentage of the wood tiles, distributed
/// fairly: the map is split into four quadrants by its center (in both
/// x and y), and each quadrant independently receives
/// `floor(total_wood * percent / 100 / 4)` bonuses on its own shuffled
/// wood, cycling Speed -> BombCapacity -> FireStrength.
pub fn distribute_bonuses(state: &mut GameState) {
    let mut woods: Vec<IVec2> = state
        .tiles
        .iter()
        .filter(|t| t.material == Material::Wood)
        .map(|t| t.position)
        .collect();
    woods.shuffle(&mut state.rng);

    let per_quadrant =
        (woods.len() as f64 * state.config.bonuses_percent as f64 / 100.0 / 4.0).floor() as usize;
    let mid_x = state.config.tiles_x as f32 / 2.0;
    let mid_y = state.config.tiles_y as f32 / 2.0;

    const KINDS: [BonusKind; 3] = [
        BonusKind::Speed,
        BonusKind::BombCapacity,
        BonusKind::FireStrength,
    ];

    for quadrant in 0..4 {
        let mut placed = 0;
        for &position in &woods {
            if placed >= per_quadrant {
                break;
            }
            let (x, y) = (position.x as f32, position.y as f32);
            let in_quadrant = match quadrant {
                0 => x < mid_x && y < mid_y,
                1 => x < mid_x && y > mid_y,
                2 => x > mid_x && y < mid_y,
                _ => x > mid_x && y > mid_y,
            };
            if in_quadrant {
                state.bonuses.push(Bonus {
                    kind: KINDS[placed % 3],
                    position,
                });
                placed += 1;
            }
        }
    }

    log::debug!(
        "Placed {} bonuses over {} wood tiles",
        state.bonuses.len(),
        woods.len()
    );
}
