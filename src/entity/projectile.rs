//! Projectile simulation

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, BuildingId, SettlementId};
use crate::spatial::geometry::{ray_rect_sweep, Rect};
use crate::spatial::SpatialQuery;
use crate::world::obstacles::Obstacle;

const PROJECTILE_SIZE: f32 = 6.0;

/// Who fired a projectile; shooters are never hit by their own side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Agent { settlement: SettlementId, agent: AgentId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub owner: ProjectileOwner,
    pub floor: usize,
    /// Building whose upper floor the projectile travels on
    pub interior: Option<(SettlementId, BuildingId)>,
    pub ttl: f32,
    pub alive: bool,
}

/// Segment travelled during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileStep {
    pub from: Vec2,
    pub to: Vec2,
    /// Set when the segment ended on an obstacle
    pub blocked: bool,
}

impl Projectile {
    pub fn new(origin: Vec2, direction: Vec2, speed: f32, damage: f32, owner: ProjectileOwner, floor: usize, ttl: f32) -> Self {
        Self {
            position: origin,
            velocity: direction.normalize_or_zero() * speed,
            damage,
            owner,
            floor,
            interior: None,
            ttl,
            alive: true,
        }
    }

    pub fn with_interior(mut self, interior: Option<(SettlementId, BuildingId)>) -> Self {
        self.interior = if self.floor > 0 { interior } else { None };
        self
    }

    /// Advance and sweep against sight-blocking obstacles (walls, closed
    /// doors, trunks). The projectile dies on impact or when its TTL runs out.
    pub fn advance<'a>(&mut self, dt: f32, obstacles: impl IntoIterator<Item = &'a Obstacle>) -> ProjectileStep {
        let from = self.position;
        let delta = self.velocity * dt;

        let hit_t = obstacles
            .into_iter()
            .filter(|o| o.blocks_sight())
            .filter_map(|o| ray_rect_sweep(from, delta, &o.rect))
            .min_by(|a, b| a.total_cmp(b));

        self.ttl -= dt;
        let step = match hit_t {
            Some(t) => {
                self.alive = false;
                ProjectileStep { from, to: from + delta * t, blocked: true }
            }
            None => ProjectileStep { from, to: from + delta, blocked: false },
        };
        self.position = step.to;
        if self.ttl <= 0.0 {
            self.alive = false;
        }
        step
    }
}

impl ProjectileStep {
    /// Entry parameter along the segment if it crosses `target`
    pub fn hits(&self, target: &Rect) -> Option<f32> {
        ray_rect_sweep(self.from, self.to - self.from, target)
    }
}

impl SpatialQuery for Projectile {
    fn rect_data(&self) -> Rect {
        Rect::new(self.position, Vec2::splat(PROJECTILE_SIZE))
    }
}
