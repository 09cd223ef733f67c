//! Headless simulation session
//!
//! Ties the subsystems together for one frame:
//! input -> player movement -> chunk streaming -> interaction and gunfire ->
//! settlement AI -> projectiles -> deaths -> pickups
//!
//! Rendering and input polling live outside; this is the orchestration a
//! game loop (or a test) drives.

use std::sync::Arc;

use glam::Vec2;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{BuildingId, FloorPoint, SettlementId};
use crate::entity::pickup::{Pickup, PickupKind};
use crate::entity::player::{Player, PlayerInput};
use crate::entity::projectile::{Projectile, ProjectileOwner, ProjectileStep};
use crate::simulation::snapshot::{AgentSnapshot, PlayerSnapshot, Snapshot};
use crate::spatial::geometry::{line_of_sight, Rect};
use crate::structures::interaction::{Interaction, InteractionContext};
use crate::world::manager::WorldManager;
use crate::world::settlement::SettlementEvent;

const KILL_SCORE: u32 = 100;
const CLEAR_SCORE: u32 = 500;
/// Extra distance beyond detection radius searched for sight-blocking trees
const TREE_LOS_MARGIN: f32 = 64.0;

/// Events produced during one step, for logs and HUD feedback
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    Settlement {
        settlement: SettlementId,
        event: SettlementEvent,
    },
    Interaction(Interaction),
    PickupCollected(PickupKind),
    PlayerShot {
        damage: f32,
    },
    PlayerDied,
}

pub struct Simulation {
    config: Arc<SimulationConfig>,
    world: WorldManager,
    player: Player,
    projectiles: Vec<Projectile>,
    pickups: Vec<Pickup>,
    tick: u64,
    elapsed: f64,
}

impl Simulation {
    /// Validate the config, spawn the player at the origin and load the
    /// chunks around it
    pub fn new(seed: u64, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let player = Player::new(Vec2::ZERO, &config.player);
        let mut world = WorldManager::new(seed, Arc::clone(&config));
        world.update_active_chunks(0.0, 0.0);
        tracing::info!(seed, settlements = world.settlement_ids().len(), "simulation started");

        Ok(Self {
            config,
            world,
            player,
            projectiles: Vec::new(),
            pickups: Vec::new(),
            tick: 0,
            elapsed: 0.0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldManager {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldManager {
        &mut self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Settlement and building the player is inside, if any
    fn player_interior(&self) -> Option<(SettlementId, BuildingId)> {
        self.player.settlement.zip(self.player.building)
    }

    /// Advance the whole simulation by `dt` seconds (clamped to the frame
    /// limit)
    pub fn step(&mut self, dt: f32, input: &PlayerInput) -> Vec<SimulationEvent> {
        let dt = dt.clamp(0.0, self.config.frame.max_dt);
        let mut events = Vec::new();
        let was_alive = self.player.is_alive();

        self.world.advance(dt);
        let intent = self.player.apply_input(input, dt, &self.config.player);
        self.move_player(dt);
        let position = self.player.position();
        self.world.update_active_chunks(position.x, position.y);

        if intent.interact {
            if let Some(interaction) = self.interact() {
                events.push(SimulationEvent::Interaction(interaction));
            }
        }
        if let Some(direction) = intent.fire {
            self.fire(direction);
        }

        self.update_settlements(dt, &mut events);
        self.advance_projectiles(dt, &mut events);
        self.reap_dead(&mut events);
        self.collect_pickups(&mut events);

        if was_alive && !self.player.is_alive() {
            tracing::info!(tick = self.tick, score = self.player.score, "player died");
            events.push(SimulationEvent::PlayerDied);
        }
        self.tick += 1;
        self.elapsed += f64::from(dt);
        events
    }

    fn move_player(&mut self, dt: f32) {
        let interior = self.player_interior();
        let rect = self.player.body.rect();
        let swept = rect.union(&Rect::new(rect.center + self.player.body.velocity * dt, rect.size));
        let obstacles = self.world.obstacles_in(swept, self.player.floor, interior);
        self.player.body.move_and_collide(dt, obstacles);

        // Ground floor location follows the footprint; upper floors are
        // entered and left by stairs
        if self.player.floor == 0 {
            let location = self.world.building_at(self.player.position());
            self.player.settlement = location.map(|(s, _)| s);
            self.player.building = location.map(|(_, b)| b);
        }
    }

    fn interact(&mut self) -> Option<Interaction> {
        let point = self.player.position();
        let floor = self.player.floor;
        let reach = self.config.player.interact_reach;

        let candidates: Vec<(SettlementId, BuildingId)> = if floor > 0 {
            self.player_interior().into_iter().collect()
        } else {
            self.world
                .settlements()
                .filter(|s| s.bounds.expanded(reach).contains(point))
                .flat_map(|s| {
                    s.buildings
                        .iter()
                        .filter(|b| b.bounds.expanded(reach).contains(point))
                        .map(move |b| (s.id, b.id))
                })
                .collect()
        };

        let mut score = 0;
        let mut drops = Vec::new();
        let mut on_score = |points: u32| score += points;
        let mut on_drop = |at: Vec2, level: usize, kind: PickupKind| drops.push(Pickup::new(at, level, kind));
        let mut on_floor_change = |level: usize, at: Vec2| {
            tracing::debug!(floor = level, x = at.x, y = at.y, "player changed floor");
        };
        let mut ctx = InteractionContext {
            reach,
            on_score: &mut on_score,
            on_drop: &mut on_drop,
            on_floor_change: &mut on_floor_change,
        };

        let mut result = None;
        for (settlement, building) in candidates {
            let Some(target) = self
                .world
                .settlement_mut(settlement)
                .and_then(|s| s.building_mut(building))
            else {
                continue;
            };
            if let Some(interaction) = target.interact_with(point, floor, &mut self.player, &mut ctx) {
                if matches!(interaction, Interaction::Stairs { .. }) {
                    self.player.settlement = Some(settlement);
                }
                result = Some(interaction);
                break;
            }
        }

        self.player.score += score;
        self.pickups.extend(drops);
        result
    }

    fn fire(&mut self, direction: Vec2) {
        let player_config = &self.config.player;
        let origin = self.player.position() + direction * (self.player.body.size * 0.5 + 2.0);
        let projectile = Projectile::new(
            origin,
            direction,
            player_config.projectile_speed,
            player_config.projectile_damage,
            ProjectileOwner::Player,
            self.player.floor,
            self.config.agents.projectile_ttl,
        )
        .with_interior(self.player_interior());
        self.projectiles.push(projectile);

        let heard_at = self.player.floor_point();
        let mut alerted = 0;
        for id in self.world.settlement_ids() {
            if let Some(settlement) = self.world.settlement_mut(id) {
                alerted += settlement.alert_nearby(heard_at, player_config.gunshot_alert_radius, 1, true);
            }
        }
        tracing::trace!(alerted, "player gunfire");
    }

    fn update_settlements(&mut self, dt: f32, events: &mut Vec<SimulationEvent>) {
        let radius = self.config.agents.detection_radius + TREE_LOS_MARGIN;
        let trunks: Vec<Rect> = self
            .world
            .trees_near(self.player.position(), radius)
            .map(|t| t.trunk.rect)
            .collect();
        let los = move |from: Vec2, to: Vec2| line_of_sight(from, to, trunks.iter());

        for id in self.world.settlement_ids() {
            let Some(settlement) = self.world.settlement_mut(id) else {
                continue;
            };
            for event in settlement.update(dt, &mut self.player, &los, &mut self.projectiles) {
                events.push(SimulationEvent::Settlement { settlement: id, event });
            }
        }
    }

    fn advance_projectiles(&mut self, dt: f32, events: &mut Vec<SimulationEvent>) {
        let mut projectiles = std::mem::take(&mut self.projectiles);
        for projectile in projectiles.iter_mut() {
            let end = projectile.position + projectile.velocity * dt;
            let swept = Rect::from_min_max(projectile.position.min(end), projectile.position.max(end));
            let step = {
                let obstacles = self.world.obstacles_in(swept, projectile.floor, projectile.interior);
                projectile.advance(dt, obstacles)
            };

            match projectile.owner {
                ProjectileOwner::Player => self.resolve_player_shot(projectile, &step),
                ProjectileOwner::Agent { .. } => {
                    let same_space = projectile.floor == self.player.floor
                        && (projectile.floor == 0 || projectile.interior == self.player_interior());
                    if same_space && self.player.is_alive() && step.hits(&self.player.body.rect()).is_some() {
                        self.player.take_damage(projectile.damage);
                        projectile.alive = false;
                        events.push(SimulationEvent::PlayerShot {
                            damage: projectile.damage,
                        });
                    }
                }
            }
        }
        projectiles.retain(|p| p.alive);
        // Shots fired this tick were pushed while the list was taken
        projectiles.append(&mut self.projectiles);
        self.projectiles = projectiles;
    }

    fn resolve_player_shot(&mut self, projectile: &mut Projectile, step: &ProjectileStep) {
        let swept = Rect::from_min_max(step.from.min(step.to), step.from.max(step.to));
        let targets: Vec<SettlementId> = match projectile.interior {
            Some((settlement, _)) if projectile.floor > 0 => vec![settlement],
            _ => self
                .world
                .settlements()
                .filter(|s| s.bounds.intersects(&swept))
                .map(|s| s.id)
                .collect(),
        };
        let interior_building = projectile.interior.map(|(_, b)| b);

        let hit = targets
            .iter()
            .filter_map(|id| {
                self.world
                    .settlement(*id)
                    .and_then(|s| s.first_hit(step, projectile.floor, interior_building))
                    .map(|(t, agent)| (t, *id, agent))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((_, settlement, agent)) = hit {
            let source = FloorPoint::new(step.from, projectile.floor);
            if let Some(s) = self.world.settlement_mut(settlement) {
                s.damage_agent(agent, projectile.damage, source);
            }
            projectile.alive = false;
        }
    }

    fn reap_dead(&mut self, events: &mut Vec<SimulationEvent>) {
        for id in self.world.settlement_ids() {
            let Some(settlement) = self.world.settlement_mut(id) else {
                continue;
            };
            for event in settlement.reap_dead() {
                match event {
                    SettlementEvent::AgentKilled { .. } => self.player.score += KILL_SCORE,
                    SettlementEvent::Cleared => self.player.score += CLEAR_SCORE,
                    SettlementEvent::PlayerHit { .. } => {}
                }
                events.push(SimulationEvent::Settlement { settlement: id, event });
            }
        }
    }

    fn collect_pickups(&mut self, events: &mut Vec<SimulationEvent>) {
        let player = &mut self.player;
        self.pickups.retain(|pickup| {
            if pickup.try_collect(player) {
                events.push(SimulationEvent::PickupCollected(pickup.kind));
                false
            } else {
                true
            }
        });
    }

    /// Serialisable HUD view of the current state
    pub fn snapshot(&self) -> Snapshot {
        let agents = self
            .world
            .settlements()
            .flat_map(|s| {
                s.agents.iter().map(move |a| AgentSnapshot {
                    settlement: s.id,
                    id: a.id,
                    variant: a.variant,
                    position: a.position(),
                    floor: a.current_floor,
                    state: a.state,
                    health: a.health,
                    max_health: a.max_health,
                    alert_level: a.alert_level,
                })
            })
            .collect();

        Snapshot {
            tick: self.tick,
            elapsed: self.elapsed,
            player: PlayerSnapshot::from(&self.player),
            agents,
            loaded_chunks: self.world.loaded_chunks(),
            settlements: self.world.settlement_ids().len(),
            cleared_settlements: self.world.settlements().filter(|s| s.cleared).count(),
            projectiles: self.projectiles.len(),
            pickups: self.pickups.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AgentState;

    fn simulation(seed: u64) -> Simulation {
        Simulation::new(seed, SimulationConfig::default()).unwrap()
    }

    #[test]
    fn test_new_loads_spawn_area() {
        let sim = simulation(1);
        assert_eq!(sim.world().loaded_chunks(), 9);
        assert_eq!(sim.player().position(), Vec2::ZERO);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.frame.max_dt = 0.0;
        assert!(Simulation::new(1, config).is_err());
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut sim = simulation(2);
        let input = PlayerInput {
            movement: Vec2::X,
            ..Default::default()
        };
        sim.step(1.0, &input);
        let max_travel = sim.config().player.speed * sim.config().frame.max_dt;
        assert!(sim.player().position().x <= max_travel + 1e-3);
        assert!(sim.player().position().x > 0.0);
    }

    #[test]
    fn test_firing_spawns_projectile_and_costs_ammo() {
        let mut sim = simulation(3);
        let ammo = sim.player().ammo;
        let input = PlayerInput {
            attack: true,
            aim: Vec2::Y,
            ..Default::default()
        };
        sim.step(0.016, &input);
        assert_eq!(sim.player().ammo, ammo - 1);
        assert!(sim
            .projectiles()
            .iter()
            .any(|p| p.owner == ProjectileOwner::Player));
    }

    #[test]
    fn test_snapshot_serialises() {
        let mut sim = simulation(4);
        for _ in 0..10 {
            sim.step(0.05, &PlayerInput::default());
        }
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.tick, 10);
        assert!(snapshot.agents.iter().all(|a| a.state != AgentState::Attack || a.alert_level == 2));
        let json = snapshot.to_json().unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_pickup_collected_on_contact() {
        let mut sim = simulation(5);
        sim.pickups.push(Pickup::new(Vec2::ZERO, 0, PickupKind::Ammo(5)));
        let ammo = sim.player().ammo;
        let events = sim.step(0.016, &PlayerInput::default());
        assert!(events.contains(&SimulationEvent::PickupCollected(PickupKind::Ammo(5))));
        assert_eq!(sim.player().ammo, ammo + 5);
        assert!(sim.pickups().is_empty());
    }
}
