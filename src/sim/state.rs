//! Game state and core simulation types
//!
//! The `GameState` exclusively owns every collection (tiles, bombs,
//! bonuses, agents); entities refer to each other by id, never by
//! long-lived references.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bot::BotBrain;
use crate::consts::*;
use crate::settings::GameConfig;
use crate::{CARDINALS, to_pixel};

/// Tile material. Absence of a tile record at a position means grass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    /// Permanent, blocks fire
    Wall,
    /// Destructible, burns away to grass
    Wood,
    /// Passable
    Grass,
}

/// A recorded tile. Only walls and wood are stored; grass is implicit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tile {
    pub material: Material,
    pub position: IVec2,
}

/// A single burning cell spawned by an exploded bomb
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fire {
    pub position: IVec2,
    /// Ticks of lethality remaining
    pub ttl: u32,
}

/// A planted bomb. Owns the fires it spawns; stays in the live
/// collection until every fire has expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    /// Agent that planted it (for capacity bookkeeping)
    pub owner: u32,
    pub position: IVec2,
    /// How far the fire reaches in each direction
    pub strength: u32,
    /// Ticks until detonation
    pub countdown: u32,
    pub exploded: bool,
    pub fires: Vec<Fire>,
}

/// Permanent stat upgrades hidden under wood tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    Speed,
    BombCapacity,
    FireStrength,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bonus {
    pub kind: BonusKind,
    pub position: IVec2,
}

/// How an agent decides where to move and when to plant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControlSource {
    /// Reads the host's input intents for the given player slot
    Manual { slot: u8 },
    /// Runs the bot decision state machine
    Autonomous(BotBrain),
}

/// A live, movable entity: player or bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    /// Grid cell, recomputed from `pixel` after each move
    pub position: IVec2,
    /// Continuous position for smooth movement
    pub pixel: Vec2,
    pub alive: bool,
    /// Opacity while dead; decremented per tick after a short delay
    pub fade_alpha: f32,
    /// Ticks since death (drives the fade delay)
    pub dead_ticks: u32,
    /// Movement speed in pixels per tick
    pub velocity: f32,
    /// Max concurrent unexploded bombs
    pub bombs_max: u32,
    /// Blast reach of bombs this agent plants
    pub bomb_strength: u32,
    /// Ids of this agent's live bombs
    pub bombs: Vec<u32>,
    /// Bomb this agent may walk off of despite standing on it
    pub escape_bomb: Option<u32>,
    pub control: ControlSource,
}

impl Agent {
    pub fn new(id: u32, position: IVec2, control: ControlSource) -> Self {
        Self {
            id,
            position,
            pixel: to_pixel(position),
            alive: true,
            fade_alpha: 1.0,
            dead_ticks: 0,
            velocity: BASE_VELOCITY,
            bombs_max: 1,
            bomb_strength: 1,
            bombs: Vec::new(),
            escape_bomb: None,
            control,
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.control, ControlSource::Autonomous(_))
    }

    /// Apply a collected bonus permanently. Bots keep their bomb
    /// capacity at 1 regardless; more would get them killed.
    pub fn apply_bonus(&mut self, kind: BonusKind) {
        match kind {
            BonusKind::Speed => self.velocity += SPEED_BONUS,
            BonusKind::BombCapacity => self.bombs_max += 1,
            BonusKind::FireStrength => self.bomb_strength += 1,
        }
        if self.is_bot() {
            self.bombs_max = 1;
        }
    }
}

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Outcome declared; only death fades still animate
    Over,
}

/// Terminal result of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Index of the surviving player
    Won { player: usize },
    Lost,
}

/// Discrete events for presentation/audio sinks. Write-only from the
/// core's perspective: the host drains them each tick, the sim never
/// waits on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BombPlanted { agent: u32, position: IVec2 },
    BombExploded { position: IVec2 },
    TileDestroyed { position: IVec2 },
    BonusCollected { agent: u32, kind: BonusKind },
    AgentDied { agent: u32, position: IVec2 },
    RoundWon { player: usize },
    RoundLost,
}

fn reseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    /// Round seed for reproducibility
    pub seed: u64,
    /// All sim randomness flows through this; a fixed seed makes every
    /// bot roll and bonus shuffle deterministic.
    /// Reseeded on deserialize; cross-session persistence is a non-goal.
    #[serde(skip, default = "reseeded_rng")]
    pub rng: Pcg32,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub outcome: Option<RoundOutcome>,
    /// Wall and wood records; grass is implicit
    pub tiles: Vec<Tile>,
    pub bombs: Vec<Bomb>,
    pub bonuses: Vec<Bonus>,
    pub players: Vec<Agent>,
    /// Bots are removed from this collection when they die
    pub bots: Vec<Agent>,
    /// Per-tick event queue, drained by the host
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh round: generate the map, hide bonuses, spawn agents.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut state = Self {
            config: config.sanitized(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            phase: GamePhase::Playing,
            outcome: None,
            tiles: Vec::new(),
            bombs: Vec::new(),
            bonuses: Vec::new(),
            players: Vec::new(),
            bots: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };

        super::grid::generate_map(&mut state);
        super::grid::distribute_bonuses(&mut state);
        state.spawn_agents();

        state
    }

    /// Discard everything and regenerate from config with a new seed
    pub fn restart(&mut self, seed: u64) {
        *self = Self::new(self.config.clone(), seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn players at opposite corners, bots at the remaining ones
    fn spawn_agents(&mut self) {
        let (tx, ty) = (self.config.tiles_x, self.config.tiles_y);
        let player_corners = [IVec2::new(1, 1), IVec2::new(tx - 2, ty - 2)];
        for slot in 0..self.config.players as usize {
            debug_assert!(self.material_at(player_corners[slot]) == Material::Grass);
            let id = self.next_entity_id();
            self.players.push(Agent::new(
                id,
                player_corners[slot],
                ControlSource::Manual { slot: slot as u8 },
            ));
        }

        let bot_corners = [
            IVec2::new(1, ty - 2),
            IVec2::new(tx - 2, 1),
            IVec2::new(tx - 2, ty - 2),
            IVec2::new(1, 1),
        ];
        let taken: Vec<IVec2> = self.players.iter().map(|p| p.position).collect();
        let mut spawned = 0;
        for corner in bot_corners {
            if spawned >= self.config.bots {
                break;
            }
            if taken.contains(&corner) {
                continue;
            }
            debug_assert!(self.material_at(corner) == Material::Grass);
            let id = self.next_entity_id();
            let brain = BotBrain::new(&mut self.rng, &self.config.bot, corner);
            self.bots
                .push(Agent::new(id, corner, ControlSource::Autonomous(brain)));
            spawned += 1;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the accumulated events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Material at a grid position; unrecorded cells are grass
    pub fn material_at(&self, position: IVec2) -> Material {
        self.tiles
            .iter()
            .find(|t| t.position == position)
            .map(|t| t.material)
            .unwrap_or(Material::Grass)
    }

    pub fn bomb_at(&self, position: IVec2) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.position == position)
    }

    pub fn has_bomb(&self, position: IVec2) -> bool {
        self.bomb_at(position).is_some()
    }

    /// All grid cells a bomb of `strength` at `position` would set on
    /// fire: its own cell plus straight runs in each direction until a
    /// wall stops the walk or wood is consumed.
    pub fn danger_positions(&self, position: IVec2, strength: u32) -> Vec<IVec2> {
        let mut positions = vec![position];

        for dir in CARDINALS {
            for step in 1..=strength as i32 {
                let cell = position + dir * step;
                match self.material_at(cell) {
                    Material::Wall => break,
                    Material::Wood => {
                        positions.push(cell);
                        break;
                    }
                    Material::Grass => positions.push(cell),
                }
            }
        }

        positions
    }

    /// True if no live bomb's blast footprint covers the cell. Used by
    /// bots to judge targets before any detonation happens.
    pub fn is_safe_cell(&self, position: IVec2) -> bool {
        self.bombs
            .iter()
            .all(|b| !self.danger_positions(b.position, b.strength).contains(&position))
    }

    /// True if the cell currently holds an active fire
    pub fn fire_at(&self, position: IVec2) -> bool {
        self.bombs
            .iter()
            .filter(|b| b.exploded)
            .any(|b| b.fires.iter().any(|f| f.position == position))
    }

    pub fn players_alive(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn bots_alive(&self) -> usize {
        self.bots.iter().filter(|b| b.alive).count()
    }

    /// Players then bots, the order everything iterates in
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.players.iter().chain(self.bots.iter())
    }

    /// Ticks until a freshly planted bomb detonates
    pub fn bomb_countdown_ticks(&self) -> u32 {
        (self.config.bomb_timer_secs * self.config.fps) as u32
    }

    /// Ticks a fire cell stays lethal
    pub fn fire_ttl_ticks(&self) -> u32 {
        ((FIRE_DURATION_SECS * self.config.fps) as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_state() -> GameState {
        GameState::new(GameConfig::default(), 42)
    }

    #[test]
    fn test_spawn_counts() {
        let state = default_state();
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.bots.len(), 2);
        assert_eq!(state.players[0].position, IVec2::new(1, 1));
        // Bots never share a corner with a player
        for bot in &state.bots {
            assert_ne!(bot.position, state.players[0].position);
        }
    }

    #[test]
    fn test_two_players_opposite_corners() {
        let config = GameConfig {
            players: 2,
            bots: 4,
            ..Default::default()
        };
        let state = GameState::new(config, 7);
        assert_eq!(state.players[1].position, IVec2::new(15, 11));
        // Both player corners are taken, so only two bots fit
        assert_eq!(state.bots.len(), 2);
    }

    #[test]
    fn test_apply_bonus_player() {
        let mut agent = Agent::new(1, IVec2::new(1, 1), ControlSource::Manual { slot: 0 });
        agent.apply_bonus(BonusKind::Speed);
        assert!((agent.velocity - (BASE_VELOCITY + SPEED_BONUS)).abs() < f32::EPSILON);
        agent.apply_bonus(BonusKind::BombCapacity);
        assert_eq!(agent.bombs_max, 2);
        agent.apply_bonus(BonusKind::FireStrength);
        assert_eq!(agent.bomb_strength, 2);
    }

    #[test]
    fn test_bot_keeps_capacity_one() {
        let state = default_state();
        let mut bot = state.bots[0].clone();
        bot.apply_bonus(BonusKind::BombCapacity);
        assert_eq!(bot.bombs_max, 1);
        // Other upgrades still apply
        bot.apply_bonus(BonusKind::FireStrength);
        assert_eq!(bot.bomb_strength, 2);
    }

    #[test]
    fn test_restart_regenerates() {
        let mut state = default_state();
        state.tiles.clear();
        state.bombs.push(Bomb {
            id: 9,
            owner: 1,
            position: IVec2::new(3, 3),
            strength: 1,
            countdown: 10,
            exploded: false,
            fires: Vec::new(),
        });
        state.time_ticks = 500;

        state.restart(43);
        assert_eq!(state.seed, 43);
        assert_eq!(state.time_ticks, 0);
        assert!(state.bombs.is_empty());
        assert!(!state.tiles.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.outcome, None);
    }

    #[test]
    fn test_determinism_same_seed() {
        let a = GameState::new(GameConfig::default(), 99);
        let b = GameState::new(GameConfig::default(), 99);
        assert_eq!(a.bonuses.len(), b.bonuses.len());
        for (x, y) in a.bonuses.iter().zip(b.bonuses.iter()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.kind, y.kind);
        }
    }
}
