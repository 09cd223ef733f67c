//! Buildings own their floors; floors own their obstacles

use ahash::AHashSet;
use glam::Vec2;
use rand::Rng;

use crate::core::types::BuildingId;
use crate::entity::pickup::PickupKind;
use crate::entity::player::Player;
use crate::spatial::geometry::Rect;
use crate::structures::interaction::{Interaction, InteractionContext};
use crate::structures::layout;
use crate::world::obstacles::{InteractableKind, Obstacle, ObstacleId, ObstacleKind, ObstacleSet};

const CONTAINER_SCORE: u32 = 50;
const CONTAINER_AMMO: u32 = 6;
const GENERATOR_SCORE: u32 = 100;
const MEDKIT_HEAL: f32 = 40.0;
/// How far from a corridor end patrol points sit
const CORRIDOR_PATROL_INSET: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct Room {
    pub rect: Rect,
    /// Door in the corridor wall
    pub door: ObstacleId,
}

#[derive(Debug, Clone)]
pub struct Floor {
    pub level: usize,
    pub obstacles: ObstacleSet,
    pub rooms: Vec<Room>,
    pub corridor: Rect,
}

impl Floor {
    /// Corridor ends followed by room centers
    pub fn patrol_points(&self) -> Vec<Vec2> {
        let y = self.corridor.center.y;
        let mut points = vec![
            Vec2::new(self.corridor.min().x + CORRIDOR_PATROL_INSET, y),
            Vec2::new(self.corridor.max().x - CORRIDOR_PATROL_INSET, y),
        ];
        points.extend(self.rooms.iter().map(|r| r.rect.center));
        points
    }
}

#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    pub bounds: Rect,
    pub floors: Vec<Floor>,
    /// Generators that already paid out
    powered_once: AHashSet<(usize, ObstacleId)>,
}

impl Building {
    pub fn new(id: BuildingId, bounds: Rect, floors: Vec<Floor>) -> Self {
        Self {
            id,
            bounds,
            floors,
            powered_once: AHashSet::new(),
        }
    }

    /// Procedurally lay out a building; see `structures::layout`
    pub fn generate(id: BuildingId, position: Vec2, size: Vec2, num_floors: usize, rng: &mut impl Rng) -> Self {
        layout::generate(id, position, size, num_floors, rng)
    }

    pub fn floor(&self, level: usize) -> Option<&Floor> {
        self.floors.get(level)
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Obstacles of one floor; empty for a floor the building lacks
    pub fn obstacles_on(&self, level: usize) -> impl Iterator<Item = &Obstacle> + '_ {
        self.floors.get(level).into_iter().flat_map(|f| f.obstacles.iter())
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
    }

    pub fn set_door_open(&mut self, level: usize, door: ObstacleId, open: bool) -> bool {
        self.floors
            .get_mut(level)
            .map_or(false, |f| f.obstacles.set_door_open(door, open))
    }

    /// Use the nearest interactive obstacle on `level` within reach of `point`.
    ///
    /// Doors toggle. Stairs move the player to the linked floor. Containers
    /// and medkits are consumed once; generators toggle and pay out the
    /// first time they are switched on.
    pub fn interact_with(
        &mut self,
        point: Vec2,
        level: usize,
        player: &mut Player,
        ctx: &mut InteractionContext<'_>,
    ) -> Option<Interaction> {
        let floor = self.floors.get_mut(level)?;
        let id = floor.obstacles.nearest_interactive(point, ctx.reach)?;

        let interaction = if let Some(open) = floor.obstacles.toggle_door(id) {
            Interaction::Door { open }
        } else {
            let obstacle = floor.obstacles.get_mut(id)?;
            let center = obstacle.rect.center;
            match &mut obstacle.kind {
                ObstacleKind::Stairs(link) => {
                    let (floor, position) = (link.target_floor, link.target_position);
                    player.move_to_floor(floor, position);
                    player.building = Some(self.id);
                    (ctx.on_floor_change)(floor, position);
                    Interaction::Stairs { floor, position }
                }
                ObstacleKind::Interactable { kind, used } => match kind {
                    InteractableKind::Container => {
                        *used = true;
                        (ctx.on_score)(CONTAINER_SCORE);
                        let drop_at = center + (point - center).normalize_or_zero() * obstacle.rect.half_size().length();
                        (ctx.on_drop)(drop_at, level, PickupKind::Ammo(CONTAINER_AMMO));
                        Interaction::Looted
                    }
                    InteractableKind::Medkit => {
                        *used = true;
                        Interaction::Healed(player.heal(MEDKIT_HEAL))
                    }
                    InteractableKind::Generator => {
                        *used = !*used;
                        if *used && self.powered_once.insert((level, id)) {
                            (ctx.on_score)(GENERATOR_SCORE);
                        }
                        Interaction::Generator { running: *used }
                    }
                },
                ObstacleKind::Door { .. } | ObstacleKind::Wall | ObstacleKind::Trunk => return None,
            }
        };

        tracing::trace!(building = self.id.0, floor = level, ?interaction, "interaction");
        Some(interaction)
    }
}
