//! Per-tick simulation controller
//!
//! One update pass per frame tick, in fixed order: players, then bots,
//! then bombs (fires included). Agent movement and planting this tick
//! is visible to the bomb pass of the same tick, and fire spawned by
//! one explosion is visible to chained detonations in the same pass.

use glam::{IVec2, Vec2};

use super::bot::{find_target, near_wood, wants_kill};
use super::collision;
use super::state::{
    Agent, Bomb, ControlSource, Fire, GameEvent, GamePhase, GameState, Material, RoundOutcome,
};
use crate::consts::*;
use crate::to_grid;

/// Input intents for one human-controlled agent, for a single tick.
/// `plant` is edge-triggered: the host sets it for exactly one tick
/// per key release.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub plant: bool,
}

impl PlayerInput {
    /// Directional intent as a unit cardinal; first pressed wins in
    /// the fixed order up, down, left, right
    pub fn direction(&self) -> IVec2 {
        if self.up {
            IVec2::new(0, -1)
        } else if self.down {
            IVec2::new(0, 1)
        } else if self.left {
            IVec2::new(-1, 0)
        } else if self.right {
            IVec2::new(1, 0)
        } else {
            IVec2::ZERO
        }
    }
}

/// All host input for a single tick, one entry per player slot
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub players: Vec<PlayerInput>,
}

impl TickInput {
    pub fn single(input: PlayerInput) -> Self {
        Self {
            players: vec![input],
        }
    }

    /// Input for a slot; missing slots read as all-idle
    pub fn player(&self, slot: usize) -> PlayerInput {
        self.players.get(slot).copied().unwrap_or_default()
    }
}

/// Advance the round by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    update_fades(state);
    if state.phase == GamePhase::Over {
        return;
    }

    state.time_ticks += 1;

    update_players(state, input);
    update_bots(state);
    update_bombs(state);
}

/// Dead agents hold full opacity briefly, then fade out one step per
/// tick. Runs even after the round is decided.
fn update_fades(state: &mut GameState) {
    for agent in state.players.iter_mut().chain(state.bots.iter_mut()) {
        if agent.alive {
            continue;
        }
        agent.dead_ticks += 1;
        if agent.dead_ticks > FADE_DELAY_TICKS {
            agent.fade_alpha = (agent.fade_alpha - FADE_STEP).max(0.0);
        }
    }
}

fn update_players(state: &mut GameState, input: &TickInput) {
    for idx in 0..state.players.len() {
        if !state.players[idx].alive {
            continue;
        }
        let slot = match state.players[idx].control {
            ControlSource::Manual { slot } => slot as usize,
            ControlSource::Autonomous(_) => continue,
        };
        let intent = input.player(slot);

        let dir = intent.direction();
        if dir != IVec2::ZERO {
            let (pixel, velocity, escape) = {
                let agent = &state.players[idx];
                (agent.pixel, agent.velocity, agent.escape_bomb)
            };
            let candidate = pixel + dir.as_vec2() * velocity;

            if !collision::hits_bomb(state, escape, candidate) {
                if collision::hits_terrain(candidate, &state.tiles) {
                    // Blocked; nudge perpendicular toward an open
                    // diagonal so the agent rounds the corner
                    let position = state.players[idx].position;
                    if let Some(fix) = collision::corner_fix(state, position, pixel, dir) {
                        let nudge = if dir.x != 0 {
                            Vec2::new(0.0, if fix.y > pixel.y { velocity } else { -velocity })
                        } else {
                            Vec2::new(if fix.x > pixel.x { velocity } else { -velocity }, 0.0)
                        };
                        let agent = &mut state.players[idx];
                        agent.pixel += nudge;
                        agent.position = to_grid(agent.pixel);
                    }
                } else {
                    let agent = &mut state.players[idx];
                    agent.pixel = candidate;
                    agent.position = to_grid(agent.pixel);
                }
            }
        }

        clear_stale_escape(state, false, idx);

        if intent.plant {
            try_plant_bomb(state, false, idx);
        }

        if state.fire_at(state.players[idx].position) {
            kill_player(state, idx);
        }

        collect_bonus(state, false, idx);
    }
}

fn update_bots(state: &mut GameState) {
    let mut any_death = false;

    for idx in 0..state.bots.len() {
        if !state.bots[idx].alive {
            continue;
        }
        let mut brain = match &state.bots[idx].control {
            ControlSource::Autonomous(brain) => brain.clone(),
            ControlSource::Manual { .. } => continue,
        };

        brain.waiting = false;
        if !brain.started {
            if brain.start_ticks_left > 0 {
                brain.start_ticks_left -= 1;
                brain.waiting = true;
            } else {
                brain.started = true;
            }
        }

        let (position, pixel) = {
            let agent = &state.bots[idx];
            (agent.position, agent.pixel)
        };

        // Deciding at target: pixel-exact arrival only
        if !brain.waiting && brain.target_pixel == pixel {
            if near_wood(state, position) || wants_kill(state, position) {
                try_plant_bomb(state, true, idx);
            }

            // Own bomb is live and this cell is outside every blast
            // footprint: hole up until it goes off
            if !state.bots[idx].bombs.is_empty() && state.is_safe_cell(position) {
                brain.waiting = true;
            }

            if !brain.waiting {
                find_target(state, &mut brain, position);
            }
        }

        if !brain.waiting && brain.target_pixel != pixel {
            // Clamp the step so we land exactly on the target cell
            let agent = &state.bots[idx];
            let mut velocity = agent.velocity;
            let dx = (brain.target_pixel.x - agent.pixel.x).abs();
            let dy = (brain.target_pixel.y - agent.pixel.y).abs();
            if dx > 0.0 && dx < velocity {
                velocity = dx;
            } else if dy > 0.0 && dy < velocity {
                velocity = dy;
            }

            let candidate = agent.pixel + brain.dir.as_vec2() * velocity;
            if !collision::hits_terrain(candidate, &state.tiles) {
                state.bots[idx].pixel = candidate;
            }
            let agent = &mut state.bots[idx];
            agent.position = to_grid(agent.pixel);
        }

        clear_stale_escape(state, true, idx);
        state.bots[idx].control = ControlSource::Autonomous(brain);

        collect_bonus(state, true, idx);

        if state.fire_at(state.bots[idx].position) {
            let agent = &mut state.bots[idx];
            agent.alive = false;
            agent.dead_ticks = 0;
            let (id, position) = (agent.id, agent.position);
            state.push_event(GameEvent::AgentDied {
                agent: id,
                position,
            });
            log::info!("Bot {id} died at {position}");
            any_death = true;
        }
    }

    if any_death {
        state.bots.retain(|b| b.alive);
        if state.outcome.is_none() && state.bots.is_empty() && state.players_alive() == 1 {
            if let Some(winner) = state.players.iter().position(|p| p.alive) {
                declare_outcome(state, RoundOutcome::Won { player: winner });
            }
        }
    }
}

fn update_bombs(state: &mut GameState) {
    // Fire lifetimes first, so fire spawned later this tick lives its
    // full duration
    for bomb in &mut state.bombs {
        if bomb.exploded {
            for fire in &mut bomb.fires {
                fire.ttl = fire.ttl.saturating_sub(1);
            }
            bomb.fires.retain(|f| f.ttl > 0);
        }
    }

    // A bomb whose last fire expired leaves the live collection and
    // releases its owner's capacity
    let mut retired: Vec<(u32, u32)> = Vec::new();
    state.bombs.retain(|b| {
        if b.exploded && b.fires.is_empty() {
            retired.push((b.id, b.owner));
            false
        } else {
            true
        }
    });
    for (bomb_id, owner) in retired {
        for agent in state.players.iter_mut().chain(state.bots.iter_mut()) {
            if agent.id == owner {
                agent.bombs.retain(|&id| id != bomb_id);
            }
            if agent.escape_bomb == Some(bomb_id) {
                agent.escape_bomb = None;
            }
        }
    }

    // Countdown pass; chained detonations run inside explode_bomb
    let ids: Vec<u32> = state.bombs.iter().map(|b| b.id).collect();
    for id in ids {
        let Some(i) = state.bombs.iter().position(|b| b.id == id) else {
            continue;
        };
        if state.bombs[i].exploded {
            continue;
        }
        if state.bombs[i].countdown > 0 {
            state.bombs[i].countdown -= 1;
        }
        if state.bombs[i].countdown == 0 {
            explode_bomb(state, id);
        }
    }
}

/// Detonate a bomb: spawn one fire per danger cell, burn wood, and
/// chain-explode any live bomb caught in the blast, all in the same
/// pass. Idempotent via the `exploded` flag, so chain cycles cannot
/// loop.
pub fn explode_bomb(state: &mut GameState, id: u32) {
    let mut worklist = vec![id];

    while let Some(bomb_id) = worklist.pop() {
        let Some(i) = state.bombs.iter().position(|b| b.id == bomb_id) else {
            continue;
        };
        if state.bombs[i].exploded {
            continue;
        }
        state.bombs[i].exploded = true;

        let position = state.bombs[i].position;
        let strength = state.bombs[i].strength;
        state.push_event(GameEvent::BombExploded { position });
        log::debug!("Bomb {bomb_id} exploded at {position}");

        let danger = state.danger_positions(position, strength);
        let ttl = state.fire_ttl_ticks();
        for cell in danger {
            if let Some(t) = state
                .tiles
                .iter()
                .position(|t| t.position == cell && t.material == Material::Wood)
            {
                state.tiles.remove(t);
                state.push_event(GameEvent::TileDestroyed { position: cell });
            }

            if let Some(other) = state.bombs.iter().find(|b| !b.exploded && b.position == cell) {
                worklist.push(other.id);
            }

            state.bombs[i].fires.push(Fire {
                position: cell,
                ttl,
            });
        }
    }
}

/// Plant a bomb at the agent's cell. Silently refuses when the cell
/// already holds a bomb or the agent's unexploded bombs are at its
/// capacity; both are normal control flow, not errors.
pub fn try_plant_bomb(state: &mut GameState, is_bot: bool, idx: usize) {
    let (agent_id, position, strength, bombs_max, bomb_ids) = {
        let agent = agent_ref(state, is_bot, idx);
        (
            agent.id,
            agent.position,
            agent.bomb_strength,
            agent.bombs_max,
            agent.bombs.clone(),
        )
    };

    if state.has_bomb(position) {
        return;
    }
    let live = bomb_ids
        .iter()
        .filter(|&&id| state.bombs.iter().any(|b| b.id == id && !b.exploded))
        .count();
    if live >= bombs_max as usize {
        return;
    }

    let id = state.next_entity_id();
    let countdown = state.bomb_countdown_ticks();
    state.bombs.push(Bomb {
        id,
        owner: agent_id,
        position,
        strength,
        countdown,
        exploded: false,
        fires: Vec::new(),
    });

    // Everyone already standing on the cell gets a one-time egress
    // exemption, not just the planter
    for agent in state.players.iter_mut().chain(state.bots.iter_mut()) {
        if agent.position == position {
            agent.escape_bomb = Some(id);
        }
        if agent.id == agent_id {
            agent.bombs.push(id);
        }
    }

    state.push_event(GameEvent::BombPlanted {
        agent: agent_id,
        position,
    });
    log::debug!("Agent {agent_id} planted bomb {id} at {position}");
}

fn agent_ref(state: &GameState, is_bot: bool, idx: usize) -> &Agent {
    if is_bot {
        &state.bots[idx]
    } else {
        &state.players[idx]
    }
}

fn agent_mut(state: &mut GameState, is_bot: bool, idx: usize) -> &mut Agent {
    if is_bot {
        &mut state.bots[idx]
    } else {
        &mut state.players[idx]
    }
}

/// Drop the escape-bomb exemption once the agent's cell no longer
/// coincides with that bomb's cell (or the bomb is gone)
fn clear_stale_escape(state: &mut GameState, is_bot: bool, idx: usize) {
    let (position, escape) = {
        let agent = agent_ref(state, is_bot, idx);
        (agent.position, agent.escape_bomb)
    };
    if let Some(id) = escape {
        let left = state
            .bombs
            .iter()
            .find(|b| b.id == id)
            .is_none_or(|b| b.position != position);
        if left {
            agent_mut(state, is_bot, idx).escape_bomb = None;
        }
    }
}

fn collect_bonus(state: &mut GameState, is_bot: bool, idx: usize) {
    let position = agent_ref(state, is_bot, idx).position;
    if let Some(i) = state.bonuses.iter().position(|b| b.position == position) {
        let bonus = state.bonuses.remove(i);
        let agent = agent_mut(state, is_bot, idx);
        agent.apply_bonus(bonus.kind);
        let id = agent.id;
        state.push_event(GameEvent::BonusCollected {
            agent: id,
            kind: bonus.kind,
        });
        log::debug!("Agent {id} collected {:?}", bonus.kind);
    }
}

fn kill_player(state: &mut GameState, idx: usize) {
    let agent = &mut state.players[idx];
    agent.alive = false;
    agent.dead_ticks = 0;
    let (id, position) = (agent.id, agent.position);
    state.push_event(GameEvent::AgentDied {
        agent: id,
        position,
    });
    log::info!("Player {idx} died at {position}");

    // Outcome is checked after every death, never re-declared
    if state.outcome.is_some() {
        return;
    }
    let alive = state.players_alive();
    if alive == 0 {
        declare_outcome(state, RoundOutcome::Lost);
    } else if state.players.len() == 2 && alive == 1 {
        if let Some(winner) = state.players.iter().position(|p| p.alive) {
            declare_outcome(state, RoundOutcome::Won { player: winner });
        }
    }
}

fn declare_outcome(state: &mut GameState, outcome: RoundOutcome) {
    if state.outcome.is_some() {
        return;
    }
    state.outcome = Some(outcome);
    state.phase = GamePhase::Over;
    match outcome {
        RoundOutcome::Won { player } => {
            state.push_event(GameEvent::RoundWon { player });
            log::info!("Round won by player {player}");
        }
        RoundOutcome::Lost => {
            state.push_event(GameEvent::RoundLost);
            log::info!("Round lost");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::state::Tile;
    use crate::to_pixel;

    /// A round on open ground: walls and wood cleared so movement and
    /// propagation are unobstructed
    fn open_state(players: u32, bots: u32) -> GameState {
        let config = GameConfig {
            players,
            bots,
            ..Default::default()
        };
        let mut state = GameState::new(config, 11);
        state.tiles.clear();
        state.bonuses.clear();
        state.drain_events();
        state
    }

    fn raw_bomb(id: u32, x: i32, y: i32, strength: u32) -> Bomb {
        Bomb {
            id,
            owner: 0,
            position: IVec2::new(x, y),
            strength,
            countdown: 1000,
            exploded: false,
            fires: Vec::new(),
        }
    }

    fn burning_bomb(id: u32, cell: IVec2) -> Bomb {
        Bomb {
            id,
            owner: 0,
            position: cell,
            strength: 1,
            countdown: 0,
            exploded: true,
            fires: vec![Fire {
                position: cell,
                ttl: 10,
            }],
        }
    }

    #[test]
    fn test_danger_positions_scenario_a() {
        let state = open_state(1, 0);
        let mut cells = state.danger_positions(IVec2::new(8, 6), 1);
        cells.sort_by_key(|p| (p.x, p.y));
        let mut expected = vec![
            IVec2::new(8, 6),
            IVec2::new(9, 6),
            IVec2::new(7, 6),
            IVec2::new(8, 7),
            IVec2::new(8, 5),
        ];
        expected.sort_by_key(|p| (p.x, p.y));
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_wall_blocks_propagation() {
        let mut state = open_state(1, 0);
        // Wall two cells right of the bomb
        state.tiles.push(Tile {
            material: Material::Wall,
            position: IVec2::new(5, 3),
        });
        let cells = state.danger_positions(IVec2::new(3, 3), 3);
        let rightward: Vec<_> = cells.iter().filter(|p| p.y == 3 && p.x > 3).collect();
        // Only the cell before the wall
        assert_eq!(rightward, vec![&IVec2::new(4, 3)]);
    }

    #[test]
    fn test_wood_included_then_blocks() {
        let mut state = open_state(1, 0);
        state.tiles.push(Tile {
            material: Material::Wood,
            position: IVec2::new(5, 3),
        });
        let cells = state.danger_positions(IVec2::new(3, 3), 3);
        let rightward: Vec<_> = cells.iter().filter(|p| p.y == 3 && p.x > 3).collect();
        assert_eq!(rightward, vec![&IVec2::new(4, 3), &IVec2::new(5, 3)]);
    }

    #[test]
    fn test_chain_reaction_same_pass() {
        let mut state = open_state(1, 0);
        state.bombs.push(raw_bomb(100, 3, 3, 1));
        state.bombs.push(raw_bomb(101, 4, 3, 1));
        state.bombs.push(raw_bomb(102, 5, 3, 1));

        explode_bomb(&mut state, 100);

        // 100 reaches 101, 101 reaches 102: all exploded with no tick delay
        assert!(state.bombs.iter().all(|b| b.exploded));
        assert!(state.bombs.iter().all(|b| !b.fires.is_empty()));
    }

    #[test]
    fn test_explosion_idempotent() {
        let mut state = open_state(1, 0);
        state.bombs.push(raw_bomb(100, 3, 3, 2));

        explode_bomb(&mut state, 100);
        let fires = state.bombs[0].fires.len();
        let events = state.events.len();

        explode_bomb(&mut state, 100);
        assert_eq!(state.bombs[0].fires.len(), fires);
        assert_eq!(state.events.len(), events);
    }

    #[test]
    fn test_explosion_burns_wood() {
        let mut state = open_state(1, 0);
        state.tiles.push(Tile {
            material: Material::Wood,
            position: IVec2::new(4, 3),
        });
        state.bombs.push(raw_bomb(100, 3, 3, 2));

        explode_bomb(&mut state, 100);

        assert_eq!(state.material_at(IVec2::new(4, 3)), Material::Grass);
        assert!(state.events.contains(&GameEvent::TileDestroyed {
            position: IVec2::new(4, 3)
        }));
    }

    #[test]
    fn test_bomb_lifecycle_through_ticks() {
        let mut state = open_state(1, 0);
        let input = TickInput::single(PlayerInput {
            plant: true,
            ..Default::default()
        });
        tick(&mut state, &input);
        assert_eq!(state.bombs.len(), 1);
        assert_eq!(state.players[0].bombs.len(), 1);

        // Walk clear of the strength-1 blast before it goes off
        let right = TickInput::single(PlayerInput {
            right: true,
            ..Default::default()
        });
        for _ in 0..40 {
            tick(&mut state, &right);
        }
        assert_eq!(state.players[0].position, IVec2::new(4, 1));

        let idle = TickInput::default();
        let mut exploded_at = None;
        for n in 0..200 {
            tick(&mut state, &idle);
            if exploded_at.is_none() && state.bombs.first().is_some_and(|b| b.exploded) {
                assert!(!state.bombs[0].fires.is_empty());
                exploded_at = Some(n);
            }
            if state.bombs.is_empty() {
                break;
            }
        }

        // Fires burned out, bomb left the live collection, capacity freed
        assert!(exploded_at.is_some());
        assert!(state.bombs.is_empty());
        assert!(state.players[0].bombs.is_empty());
        assert!(state.players[0].alive);
        assert_eq!(state.outcome, None);
    }

    #[test]
    fn test_escape_bomb_exemption() {
        let mut state = open_state(1, 0);
        let plant = TickInput::single(PlayerInput {
            plant: true,
            ..Default::default()
        });
        tick(&mut state, &plant);
        let bomb_id = state.bombs[0].id;
        assert_eq!(state.players[0].escape_bomb, Some(bomb_id));

        // Walk right off the bomb cell
        let right = TickInput::single(PlayerInput {
            right: true,
            ..Default::default()
        });
        for _ in 0..10 {
            tick(&mut state, &right);
        }
        assert_eq!(state.players[0].position, IVec2::new(2, 1));
        // Exemption gone once the cells differ
        assert_eq!(state.players[0].escape_bomb, None);

        // And the bomb cell is now impassable again: walking back left
        // stops at the cell boundary instead of re-entering
        let left = TickInput::single(PlayerInput {
            left: true,
            ..Default::default()
        });
        for _ in 0..10 {
            tick(&mut state, &left);
        }
        assert_eq!(state.players[0].position, IVec2::new(2, 1));
        assert!(state.players[0].pixel.x >= 48.0);
    }

    #[test]
    fn test_scenario_b_lone_player_dies() {
        let mut state = open_state(1, 0);
        let cell = state.players[0].position;
        state.bombs.push(burning_bomb(50, cell));

        tick(&mut state, &TickInput::default());

        assert!(!state.players[0].alive);
        assert_eq!(state.outcome, Some(RoundOutcome::Lost));
        assert!(state.events.contains(&GameEvent::RoundLost));
    }

    #[test]
    fn test_scenario_c_survivor_wins() {
        let mut state = open_state(2, 0);
        let cell = state.players[1].position;
        state.bombs.push(burning_bomb(50, cell));

        tick(&mut state, &TickInput::default());

        assert!(state.players[0].alive);
        assert!(!state.players[1].alive);
        assert_eq!(state.outcome, Some(RoundOutcome::Won { player: 0 }));
    }

    #[test]
    fn test_outcome_never_redeclared() {
        let mut state = open_state(2, 0);
        state.bombs.push(burning_bomb(50, state.players[1].position));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.outcome, Some(RoundOutcome::Won { player: 0 }));

        // Fire under the survivor changes nothing once the round is over
        state.bombs.push(burning_bomb(51, state.players[0].position));
        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.outcome, Some(RoundOutcome::Won { player: 0 }));
        assert!(state.players[0].alive);
    }

    #[test]
    fn test_scenario_d_capacity_limits_bot() {
        let mut state = open_state(1, 1);
        let bot_id = state.bots[0].id;
        let mut bomb = raw_bomb(200, 9, 9, 1);
        bomb.owner = bot_id;
        state.bombs.push(bomb);
        state.bots[0].bombs.push(200);

        try_plant_bomb(&mut state, true, 0);
        assert_eq!(state.bombs.len(), 1);

        // Once the first bomb has exploded the capacity frees up
        state.bombs[0].exploded = true;
        try_plant_bomb(&mut state, true, 0);
        assert_eq!(state.bombs.len(), 2);
    }

    #[test]
    fn test_no_double_bomb_on_cell() {
        let mut state = open_state(1, 0);
        state.players[0].bombs_max = 5;
        let plant = TickInput::single(PlayerInput {
            plant: true,
            ..Default::default()
        });
        tick(&mut state, &plant);
        tick(&mut state, &plant);
        assert_eq!(state.bombs.len(), 1);
    }

    #[test]
    fn test_bot_startup_delay_holds_still() {
        let mut state = open_state(1, 1);
        if let ControlSource::Autonomous(brain) = &mut state.bots[0].control {
            brain.start_ticks_left = 3;
            brain.started = false;
        }
        let idle = TickInput::default();
        let pixel = state.bots[0].pixel;
        for _ in 0..3 {
            tick(&mut state, &idle);
            assert_eq!(state.bots[0].pixel, pixel);
        }
        // Delay elapsed: the bot picks a target and starts moving
        tick(&mut state, &idle);
        assert_ne!(state.bots[0].pixel, pixel);
    }

    #[test]
    fn test_bot_aggression_branch_is_injectable() {
        for (chance, expect_bomb) in [(1.0, true), (0.0, false)] {
            let mut state = open_state(1, 1);
            state.config.bot.aggression_chance = chance;
            // Park the bot next to the player, already at its target
            let cell = state.players[0].position + IVec2::new(1, 0);
            let bot = &mut state.bots[0];
            bot.position = cell;
            bot.pixel = to_pixel(cell);
            if let ControlSource::Autonomous(brain) = &mut bot.control {
                brain.started = true;
                brain.start_ticks_left = 0;
                brain.target = cell;
                brain.target_pixel = to_pixel(cell);
            }

            tick(&mut state, &TickInput::default());
            assert_eq!(!state.bombs.is_empty(), expect_bomb, "chance {chance}");
        }
    }

    #[test]
    fn test_bot_waits_on_safe_cell_while_bomb_live() {
        let mut state = open_state(1, 1);
        let cell = IVec2::new(8, 6);
        let bot_id = state.bots[0].id;
        {
            let bot = &mut state.bots[0];
            bot.position = cell;
            bot.pixel = to_pixel(cell);
            if let ControlSource::Autonomous(brain) = &mut bot.control {
                brain.started = true;
                brain.start_ticks_left = 0;
                brain.target = cell;
                brain.target_pixel = to_pixel(cell);
            }
        }
        // The bot owns a live bomb far away; its own cell is safe
        let mut bomb = raw_bomb(300, 2, 10, 1);
        bomb.owner = bot_id;
        state.bombs.push(bomb);
        state.bots[0].bombs.push(300);

        let pixel = state.bots[0].pixel;
        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.bots[0].pixel, pixel);
        }
    }

    #[test]
    fn test_tick_determinism() {
        let config = GameConfig::default();
        let mut a = GameState::new(config.clone(), 4242);
        let mut b = GameState::new(config, 4242);
        let idle = TickInput::default();

        for _ in 0..600 {
            tick(&mut a, &idle);
            tick(&mut b, &idle);
            a.drain_events();
            b.drain_events();
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.bombs.len(), b.bombs.len());
        assert_eq!(a.bots.len(), b.bots.len());
        for (x, y) in a.bots.iter().zip(b.bots.iter()) {
            assert_eq!(x.pixel, y.pixel);
            assert_eq!(x.position, y.position);
        }
    }

    #[test]
    fn test_full_round_smoke() {
        let mut state = GameState::new(GameConfig::default(), 7);
        let idle = TickInput::default();
        let (tx, ty) = (state.config.tiles_x, state.config.tiles_y);

        for _ in 0..5000 {
            tick(&mut state, &idle);
            state.drain_events();
            for agent in state.agents() {
                assert!(agent.position.x >= 0 && agent.position.x < tx);
                assert!(agent.position.y >= 0 && agent.position.y < ty);
            }
            // At most one bomb per cell, ever
            for (i, a) in state.bombs.iter().enumerate() {
                for b in state.bombs.iter().skip(i + 1) {
                    assert_ne!(a.position, b.position);
                }
            }
            if state.outcome.is_some() {
                break;
            }
        }
    }
}
