//! Settlements: a cluster of buildings and the agents guarding them
//!
//! A settlement owns its buildings and agents outright. Agents refer back to
//! their building by index only. The per-tick update snapshots agent
//! positions, runs every agent against a read-only context, and applies the
//! collected side effects (doors, shots, melee hits, ally alerts) once the
//! pass is over. Deaths are removed in a separate pass so no agent is
//! skipped or updated twice.

use std::sync::Arc;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{Agent, AgentContext, AgentVariant, DoorRequest, PlayerView};
use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, BuildingId, FloorPoint, SettlementId};
use crate::entity::player::Player;
use crate::entity::projectile::{Projectile, ProjectileOwner, ProjectileStep};
use crate::pathfinding::Pathfinder;
use crate::spatial::geometry::Rect;
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::structures::building::Building;
use crate::world::obstacles::Obstacle;

/// Half the side of the square a settlement occupies
pub const SETTLEMENT_HALF_EXTENT: f32 = 640.0;

/// Building slot centres relative to the settlement centre
const BUILDING_SLOTS: [(f32, f32); 4] = [(-270.0, -220.0), (270.0, -220.0), (-270.0, 220.0), (270.0, 220.0)];
const BUILDING_WIDTH: (f32, f32) = (360.0, 460.0);
const BUILDING_HEIGHT: (f32, f32) = (260.0, 320.0);
const MAX_FLOORS: usize = 3;
/// Outdoor patrol loop, inset from the settlement edge
const PERIMETER_PATROL_OFFSET: f32 = 560.0;
const NEIGHBOR_CELL_SIZE: f32 = 64.0;

/// Something that happened inside a settlement this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SettlementEvent {
    AgentKilled { agent: AgentId, position: FloorPoint },
    PlayerHit { damage: f32 },
    Cleared,
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub id: SettlementId,
    pub center: Vec2,
    pub bounds: Rect,
    pub buildings: Vec<Building>,
    pub agents: Vec<Agent>,
    /// Set once the last agent died
    pub cleared: bool,
    config: Arc<SimulationConfig>,
    pathfinder: Pathfinder,
    neighbors: SparseHashGrid<(AgentId, usize)>,
}

impl Settlement {
    pub fn new(id: SettlementId, center: Vec2, config: Arc<SimulationConfig>) -> Self {
        let pathfinder = Pathfinder::new(config.pathfinding.clone());
        Self {
            id,
            center,
            bounds: Rect::new(center, Vec2::splat(SETTLEMENT_HALF_EXTENT * 2.0)),
            buildings: Vec::new(),
            agents: Vec::new(),
            cleared: false,
            config,
            pathfinder,
            neighbors: SparseHashGrid::new(NEIGHBOR_CELL_SIZE),
        }
    }

    /// Lay out buildings and populate them with guards.
    ///
    /// Every random choice, including each agent's own seed, comes from
    /// `rng`, so the result is fixed by the caller's stream.
    pub fn generate(id: SettlementId, center: Vec2, config: Arc<SimulationConfig>, rng: &mut impl Rng) -> Self {
        let mut settlement = Self::new(id, center, config);

        let mut slots = BUILDING_SLOTS;
        slots.shuffle(rng);
        let count = rng.gen_range(2..=slots.len());
        for (index, (dx, dy)) in slots.iter().take(count).enumerate() {
            let size = Vec2::new(
                rng.gen_range(BUILDING_WIDTH.0..=BUILDING_WIDTH.1).round(),
                rng.gen_range(BUILDING_HEIGHT.0..=BUILDING_HEIGHT.1).round(),
            );
            let floors = rng.gen_range(1..=MAX_FLOORS);
            let building = Building::generate(BuildingId(index as u32), center + Vec2::new(*dx, *dy), size, floors, rng);
            settlement.buildings.push(building);
        }

        settlement.spawn_guards(rng);
        tracing::debug!(
            settlement = ?id,
            buildings = settlement.buildings.len(),
            agents = settlement.agents.len(),
            "settlement generated"
        );
        settlement
    }

    fn spawn_guards(&mut self, rng: &mut impl Rng) {
        let o = PERIMETER_PATROL_OFFSET;
        let corners: Vec<FloorPoint> = [(-o, -o), (o, -o), (o, o), (-o, o)]
            .iter()
            .map(|(x, y)| FloorPoint::ground(self.center + Vec2::new(*x, *y)))
            .collect();

        let mut next_id = 0u32;
        let outdoor = rng.gen_range(2..=3);
        for i in 0..outdoor {
            let mut route = corners.clone();
            route.rotate_left(i % corners.len());
            let start = route[0];
            self.spawn(AgentId(next_id), start, None, route, rng);
            next_id += 1;
        }

        let routes: Vec<(BuildingId, usize, Vec<Vec2>)> = self
            .buildings
            .iter()
            .flat_map(|b| b.floors.iter().map(move |f| (b.id, f.level, f.patrol_points())))
            .collect();
        for (building, level, points) in routes {
            let route: Vec<FloorPoint> = points.into_iter().map(|p| FloorPoint::new(p, level)).collect();
            let Some(start) = route.first().copied() else {
                continue;
            };
            self.spawn(AgentId(next_id), start, Some(building), route, rng);
            next_id += 1;
        }
    }

    fn spawn(&mut self, id: AgentId, start: FloorPoint, building: Option<BuildingId>, route: Vec<FloorPoint>, rng: &mut impl Rng) {
        let variant = AgentVariant::roll(rng);
        let seed = rng.gen::<u64>();
        self.agents
            .push(Agent::new(id, variant, start, building, route, seed, &self.config.agents));
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.index())
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(id.index())
    }

    /// Building whose footprint contains `point`
    pub fn building_at(&self, point: Vec2) -> Option<BuildingId> {
        self.buildings.iter().find(|b| b.contains(point)).map(|b| b.id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Obstacles on a floor: all ground floors for floor 0, otherwise that
    /// floor of one building
    pub fn obstacles_on(&self, building: Option<BuildingId>, floor: usize) -> Box<dyn Iterator<Item = &Obstacle> + '_> {
        if floor == 0 {
            Box::new(self.buildings.iter().flat_map(|b| b.obstacles_on(0)))
        } else {
            let owner = building.and_then(|id| self.building(id));
            Box::new(owner.into_iter().flat_map(move |b| b.obstacles_on(floor)))
        }
    }

    /// Run one AI tick for every agent.
    ///
    /// `los` tests sight lines against blockers the settlement does not own
    /// (trees). Agent shots are appended to `projectiles`.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut Player,
        los: &dyn Fn(Vec2, Vec2) -> bool,
        projectiles: &mut Vec<Projectile>,
    ) -> Vec<SettlementEvent> {
        let mut events = Vec::new();
        if self.agents.is_empty() {
            return events;
        }

        let config = Arc::clone(&self.config);
        let agent_config = &config.agents;
        let local_building = if player.settlement == Some(self.id) {
            player.building
        } else {
            None
        };
        let view = PlayerView::new(player, local_building, agent_config.sneak_detection_multiplier);

        self.neighbors.rebuild(
            self.agents
                .iter()
                .filter(|a| a.is_alive())
                .map(|a| ((a.id, a.current_floor), a.position())),
        );

        let mut doors: Vec<DoorRequest> = Vec::new();
        let mut sightings: Vec<(AgentId, Vec2, FloorPoint)> = Vec::new();
        let mut gunfire: Vec<(AgentId, FloorPoint)> = Vec::new();
        {
            let ctx = AgentContext {
                config: agent_config,
                pathfinder: &self.pathfinder,
                grid_size: config.pathfinding.grid_size,
                buildings: &self.buildings,
                bounds: self.bounds,
                player: view,
                los,
                neighbors: &self.neighbors,
            };

            for agent in self.agents.iter_mut() {
                let outcome = agent.update(dt, &ctx);
                if !agent.is_alive() {
                    continue;
                }
                agent
                    .body
                    .move_and_collide(dt, ctx.obstacles(agent.building, agent.current_floor));

                if let Some(door) = outcome.door {
                    doors.push(door);
                }
                if let Some(shot) = outcome.shot {
                    let owner = ProjectileOwner::Agent {
                        settlement: self.id,
                        agent: agent.id,
                    };
                    let projectile = Projectile::new(
                        shot.origin,
                        shot.direction,
                        agent_config.projectile_speed,
                        shot.damage,
                        owner,
                        shot.floor,
                        agent_config.projectile_ttl,
                    )
                    .with_interior(agent.building.map(|b| (self.id, b)));
                    projectiles.push(projectile);
                    gunfire.push((agent.id, agent.floor_point()));
                }
                if let Some(damage) = outcome.melee_damage {
                    player.take_damage(damage);
                    events.push(SettlementEvent::PlayerHit { damage });
                }
                if let Some(seen) = outcome.sighted {
                    sightings.push((agent.id, agent.position(), seen));
                }
            }
        }

        for door in doors {
            if let Some(building) = self.building_mut(door.building) {
                if building.set_door_open(door.floor, door.door, true) {
                    tracing::trace!(building = door.building.0, floor = door.floor, "agent opened door");
                }
            }
        }
        for (source, origin, seen) in sightings {
            self.alert_allies(source, origin, seen, agent_config.sighting_alert_radius, false);
        }
        for (source, shooter) in gunfire {
            self.alert_allies(source, shooter.position, shooter, agent_config.gunfire_alert_radius, true);
        }

        events.extend(self.reap_dead());
        events
    }

    fn alert_allies(&mut self, source: AgentId, origin: Vec2, target: FloorPoint, radius: f32, gunshot: bool) {
        let config = Arc::clone(&self.config);
        for ally in self.agents.iter_mut().filter(|a| a.id != source && a.is_alive()) {
            if ally.position().distance(origin) <= radius {
                ally.alert_at(target, 1, gunshot, &config.agents);
            }
        }
    }

    /// Alert every living agent within `radius` of `point`
    pub fn alert_nearby(&mut self, point: FloorPoint, radius: f32, level: u8, gunshot: bool) -> usize {
        let config = Arc::clone(&self.config);
        let mut alerted = 0;
        for agent in self.agents.iter_mut().filter(|a| a.is_alive()) {
            if agent.position().distance(point.position) <= radius {
                agent.alert_at(point, level, gunshot, &config.agents);
                alerted += 1;
            }
        }
        alerted
    }

    /// First living agent crossed by a projectile segment on `floor`.
    ///
    /// Upper floors only hold agents of `interior`'s building.
    pub fn first_hit(&self, step: &ProjectileStep, floor: usize, interior: Option<BuildingId>) -> Option<(f32, AgentId)> {
        self.agents
            .iter()
            .filter(|a| a.is_alive() && a.current_floor == floor)
            .filter(|a| floor == 0 || a.building == interior)
            .filter_map(|a| step.hits(&a.body.rect()).map(|t| (t, a.id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Returns true if the hit killed the agent
    pub fn damage_agent(&mut self, id: AgentId, amount: f32, source: FloorPoint) -> bool {
        let config = Arc::clone(&self.config);
        self.agents
            .iter_mut()
            .find(|a| a.id == id)
            .map_or(false, |a| a.take_damage(amount, source, &config.agents))
    }

    /// Remove dead agents, alert their neighbours and report a clear
    pub fn reap_dead(&mut self) -> Vec<SettlementEvent> {
        let mut events = Vec::new();
        let dead: Vec<(AgentId, FloorPoint)> = self
            .agents
            .iter()
            .filter(|a| !a.is_alive())
            .map(|a| (a.id, a.floor_point()))
            .collect();
        if dead.is_empty() {
            return events;
        }

        self.agents.retain(|a| a.is_alive());
        let radius = self.config.agents.death_alert_radius;
        for (agent, position) in dead {
            tracing::debug!(settlement = ?self.id, agent = agent.0, "agent killed");
            self.alert_nearby(position, radius, 1, false);
            events.push(SettlementEvent::AgentKilled { agent, position });
        }

        if self.agents.is_empty() && !self.cleared {
            self.cleared = true;
            tracing::info!(settlement = ?self.id, "settlement cleared");
            events.push(SettlementEvent::Cleared);
        }
        events
    }
}
