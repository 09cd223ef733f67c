//! What an agent may read during its update, and what it asks for back

use glam::Vec2;

use crate::core::config::AgentConfig;
use crate::core::types::{AgentId, BuildingId, FloorPoint};
use crate::entity::player::Player;
use crate::pathfinding::Pathfinder;
use crate::spatial::geometry::Rect;
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::structures::building::Building;
use crate::world::obstacles::{has_line_of_sight, Obstacle, ObstacleId};

/// Snapshot of the player as seen by one settlement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub floor: usize,
    /// Building handle, only set when the building belongs to the
    /// settlement doing the looking
    pub building: Option<BuildingId>,
    pub size: f32,
    /// Multiplier on detection radius (sneaking shrinks it)
    pub detection_multiplier: f32,
    pub alive: bool,
}

impl PlayerView {
    pub fn new(player: &Player, local_building: Option<BuildingId>, sneak_factor: f32) -> Self {
        Self {
            position: player.position(),
            floor: player.floor,
            building: local_building,
            size: player.body.size,
            detection_multiplier: player.detection_multiplier(sneak_factor),
            alive: player.is_alive(),
        }
    }

    pub fn floor_point(&self) -> FloorPoint {
        FloorPoint::new(self.position, self.floor)
    }

    /// True when the player occupies the same walkable space as an agent
    /// on `floor` of `building`. Floor 0 is shared ground.
    pub fn shares_space(&self, building: Option<BuildingId>, floor: usize) -> bool {
        self.floor == floor && (floor == 0 || self.building == building)
    }
}

/// Read-only environment handed to `Agent::update`
pub struct AgentContext<'a> {
    pub config: &'a AgentConfig,
    pub pathfinder: &'a Pathfinder,
    pub grid_size: f32,
    pub buildings: &'a [Building],
    /// Outer limit for path searches
    pub bounds: Rect,
    pub player: PlayerView,
    /// Extra line-of-sight test for blockers outside the settlement (trees)
    pub los: &'a dyn Fn(Vec2, Vec2) -> bool,
    /// Agent positions at the start of the tick, keyed by id and floor
    pub neighbors: &'a SparseHashGrid<(AgentId, usize)>,
}

impl<'a> AgentContext<'a> {
    pub fn building(&self, id: BuildingId) -> Option<&'a Building> {
        self.buildings.get(id.index())
    }

    /// Obstacles on a floor: every building's ground floor for floor 0,
    /// otherwise that floor of the agent's own building
    pub fn obstacles(&self, building: Option<BuildingId>, floor: usize) -> Box<dyn Iterator<Item = &'a Obstacle> + 'a> {
        let buildings = self.buildings;
        if floor == 0 {
            Box::new(buildings.iter().flat_map(|b| b.obstacles_on(0)))
        } else {
            let owner = building.and_then(|id| buildings.get(id.index()));
            Box::new(owner.into_iter().flat_map(move |b| b.obstacles_on(floor)))
        }
    }

    /// Doors on a floor together with the handle needed to open them
    pub fn doors(&self, building: Option<BuildingId>, floor: usize) -> Vec<(DoorRequest, &'a Obstacle)> {
        let buildings: Box<dyn Iterator<Item = &'a Building> + 'a> = if floor == 0 {
            Box::new(self.buildings.iter())
        } else {
            Box::new(building.and_then(|id| self.buildings.get(id.index())).into_iter())
        };
        buildings
            .flat_map(move |b| {
                b.floor(floor)
                    .into_iter()
                    .flat_map(move |f| f.obstacles.doors())
                    .map(move |(door, o)| {
                        (
                            DoorRequest {
                                building: b.id,
                                floor,
                                door,
                            },
                            o,
                        )
                    })
            })
            .collect()
    }

    /// Unobstructed sight line on a floor; the ground floor also consults
    /// the external test
    pub fn clear_line(&self, building: Option<BuildingId>, floor: usize, from: Vec2, to: Vec2) -> bool {
        has_line_of_sight(from, to, self.obstacles(building, floor)) && (floor > 0 || (self.los)(from, to))
    }

    /// Search bounds for a path on `floor`: the building for upper floors,
    /// the settlement area on the ground
    pub fn search_bounds(&self, building: Option<BuildingId>, floor: usize) -> Rect {
        match building.and_then(|id| self.building(id)) {
            Some(b) if floor > 0 => b.bounds.expanded(self.grid_size * 2.0),
            _ => self.bounds,
        }
    }
}

/// Open a specific door
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorRequest {
    pub building: BuildingId,
    pub floor: usize,
    pub door: ObstacleId,
}

/// Fire a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub origin: Vec2,
    pub direction: Vec2,
    pub damage: f32,
    pub floor: usize,
}

/// Side effects of one agent update, applied by the settlement after the
/// agent's step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOutcome {
    pub door: Option<DoorRequest>,
    pub shot: Option<ShotRequest>,
    pub melee_damage: Option<f32>,
    /// Player position when first spotted this tick
    pub sighted: Option<FloorPoint>,
}
