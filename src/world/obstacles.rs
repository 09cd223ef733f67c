//! Obstacles and per-floor obstacle storage
//!
//! Every obstacle is an axis-aligned rectangle with a kind. Whether it
//! blocks movement or sight is derived from the kind and its mutable state,
//! so opening a door is a flag flip on an existing entry; nothing is
//! rebuilt.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::spatial::geometry::{self, Rect};
use crate::spatial::SpatialQuery;

/// Handle to an obstacle inside its `ObstacleSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

/// Kinds of interactable props placed in rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractableKind {
    Container,
    Medkit,
    Generator,
}

impl InteractableKind {
    /// Large props block movement, pickups do not
    pub fn is_solid(&self) -> bool {
        match self {
            InteractableKind::Container | InteractableKind::Generator => true,
            InteractableKind::Medkit => false,
        }
    }

    pub fn footprint(&self) -> Vec2 {
        match self {
            InteractableKind::Container => Vec2::new(40.0, 28.0),
            InteractableKind::Medkit => Vec2::new(18.0, 14.0),
            InteractableKind::Generator => Vec2::new(36.0, 36.0),
        }
    }
}

/// One end of a bidirectional stair connection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StairLink {
    pub target_floor: usize,
    pub target_position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Wall,
    Door { open: bool },
    Stairs(StairLink),
    Interactable { kind: InteractableKind, used: bool },
    /// Tree trunk
    Trunk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn wall(rect: Rect) -> Self {
        Self { rect, kind: ObstacleKind::Wall }
    }

    pub fn door(rect: Rect) -> Self {
        Self {
            rect,
            kind: ObstacleKind::Door { open: false },
        }
    }

    pub fn stairs(rect: Rect, link: StairLink) -> Self {
        Self {
            rect,
            kind: ObstacleKind::Stairs(link),
        }
    }

    pub fn interactable(center: Vec2, kind: InteractableKind) -> Self {
        Self {
            rect: Rect::new(center, kind.footprint()),
            kind: ObstacleKind::Interactable { kind, used: false },
        }
    }

    pub fn trunk(rect: Rect) -> Self {
        Self { rect, kind: ObstacleKind::Trunk }
    }

    pub fn is_door(&self) -> bool {
        matches!(self.kind, ObstacleKind::Door { .. })
    }

    /// Only doors can be open
    pub fn is_open(&self) -> bool {
        matches!(self.kind, ObstacleKind::Door { open: true })
    }

    pub fn is_stairs(&self) -> bool {
        matches!(self.kind, ObstacleKind::Stairs(_))
    }

    pub fn stair_link(&self) -> Option<&StairLink> {
        match &self.kind {
            ObstacleKind::Stairs(link) => Some(link),
            _ => None,
        }
    }

    pub fn interactable_kind(&self) -> Option<InteractableKind> {
        match self.kind {
            ObstacleKind::Interactable { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Returns true if movement (and pathfinding) cannot pass through
    pub fn blocks_movement(&self) -> bool {
        match &self.kind {
            ObstacleKind::Wall | ObstacleKind::Trunk => true,
            ObstacleKind::Door { open } => !open,
            ObstacleKind::Stairs(_) => false,
            ObstacleKind::Interactable { kind, .. } => kind.is_solid(),
        }
    }

    /// Returns true if the obstacle hides what is behind it
    pub fn blocks_sight(&self) -> bool {
        match &self.kind {
            ObstacleKind::Wall | ObstacleKind::Trunk => true,
            ObstacleKind::Door { open } => !open,
            ObstacleKind::Stairs(_) | ObstacleKind::Interactable { .. } => false,
        }
    }

    /// Doors, stairs and unused props respond to `interact`
    pub fn is_interactive(&self) -> bool {
        match &self.kind {
            ObstacleKind::Door { .. } | ObstacleKind::Stairs(_) => true,
            ObstacleKind::Interactable { kind, used } => !used || *kind == InteractableKind::Generator,
            ObstacleKind::Wall | ObstacleKind::Trunk => false,
        }
    }
}

impl SpatialQuery for Obstacle {
    fn rect_data(&self) -> Rect {
        self.rect
    }
}

/// Handle-based obstacle storage for one floor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len() as u32);
        self.obstacles.push(obstacle);
        id
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.obstacles.iter()
    }

    pub fn iter_with_ids(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.obstacles
            .iter()
            .enumerate()
            .map(|(i, o)| (ObstacleId(i as u32), o))
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn doors(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.iter_with_ids().filter(|(_, o)| o.is_door())
    }

    pub fn stairs(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.obstacles.iter().filter(|o| o.is_stairs())
    }

    pub fn interactables(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.obstacles
            .iter()
            .filter(|o| o.interactable_kind().is_some())
    }

    /// Set a door's state. Returns false if the handle is not a door.
    pub fn set_door_open(&mut self, id: ObstacleId, open: bool) -> bool {
        match self.get_mut(id).map(|o| &mut o.kind) {
            Some(ObstacleKind::Door { open: state }) => {
                *state = open;
                true
            }
            _ => false,
        }
    }

    /// Flip a door. Returns the new state, or None if not a door.
    pub fn toggle_door(&mut self, id: ObstacleId) -> Option<bool> {
        match self.get_mut(id).map(|o| &mut o.kind) {
            Some(ObstacleKind::Door { open }) => {
                *open = !*open;
                Some(*open)
            }
            _ => None,
        }
    }

    /// Nearest interactive obstacle whose rectangle lies within `reach`
    pub fn nearest_interactive(&self, point: Vec2, reach: f32) -> Option<ObstacleId> {
        self.iter_with_ids()
            .filter(|(_, o)| o.is_interactive())
            .map(|(id, o)| (id, o.rect.distance_to(point)))
            .filter(|(_, d)| *d <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

/// True when no sight-blocking obstacle lies between two points
pub fn has_line_of_sight<'a>(from: Vec2, to: Vec2, obstacles: impl IntoIterator<Item = &'a Obstacle>) -> bool {
    geometry::line_of_sight(
        from,
        to,
        obstacles
            .into_iter()
            .filter(|o| o.blocks_sight())
            .map(|o| &o.rect),
    )
}

/// True if the point lies inside a movement-blocking obstacle
pub fn point_blocked<'a>(point: Vec2, obstacles: impl IntoIterator<Item = &'a Obstacle>) -> bool {
    obstacles
        .into_iter()
        .any(|o| o.blocks_movement() && o.rect.contains(point))
}
