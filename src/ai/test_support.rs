//! Shared fixtures for AI unit tests

use glam::Vec2;

use crate::ai::agent::Agent;
use crate::ai::context::{AgentContext, PlayerView};
use crate::ai::variant::AgentVariant;
use crate::core::config::{AgentConfig, PathfindingConfig};
use crate::core::types::{AgentId, FloorPoint};
use crate::pathfinding::Pathfinder;
use crate::spatial::geometry::Rect;
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::structures::building::Building;

pub(crate) fn open_los(_: Vec2, _: Vec2) -> bool {
    true
}

pub(crate) fn player_at(position: Vec2) -> PlayerView {
    PlayerView {
        position,
        floor: 0,
        building: None,
        size: 24.0,
        detection_multiplier: 1.0,
        alive: true,
    }
}

/// Player far outside any detection radius
pub(crate) fn absent_player() -> PlayerView {
    player_at(Vec2::splat(100_000.0))
}

pub(crate) fn agent_at(variant: AgentVariant, position: Vec2) -> Agent {
    Agent::new(
        AgentId(1),
        variant,
        FloorPoint::ground(position),
        None,
        Vec::new(),
        11,
        &AgentConfig::default(),
    )
}

pub(crate) struct Fixture {
    pub config: AgentConfig,
    pub pathfinder: Pathfinder,
    pub buildings: Vec<Building>,
    pub neighbors: SparseHashGrid<(AgentId, usize)>,
    pub bounds: Rect,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            config: AgentConfig::default(),
            pathfinder: Pathfinder::new(PathfindingConfig::default()),
            buildings: Vec::new(),
            neighbors: SparseHashGrid::new(64.0),
            bounds: Rect::new(Vec2::ZERO, Vec2::splat(2048.0)),
        }
    }

    pub fn context<'a>(&'a self, player: PlayerView, los: &'a dyn Fn(Vec2, Vec2) -> bool) -> AgentContext<'a> {
        AgentContext {
            config: &self.config,
            pathfinder: &self.pathfinder,
            grid_size: 32.0,
            buildings: &self.buildings,
            bounds: self.bounds,
            player,
            los,
            neighbors: &self.neighbors,
        }
    }
}
