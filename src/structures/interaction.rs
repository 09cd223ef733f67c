//! Capabilities handed to building interactions

use glam::Vec2;

use crate::entity::pickup::PickupKind;

/// Explicit context for `Building::interact_with`.
///
/// Carries only what an interaction may do to the outside world: award
/// score, spawn a drop, announce a floor change.
pub struct InteractionContext<'a> {
    /// Maximum distance from the interaction point to an obstacle edge
    pub reach: f32,
    pub on_score: &'a mut dyn FnMut(u32),
    /// Drop position, floor, item
    pub on_drop: &'a mut dyn FnMut(Vec2, usize, PickupKind),
    /// New floor and arrival position
    pub on_floor_change: &'a mut dyn FnMut(usize, Vec2),
}

/// Outcome of a successful interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Door { open: bool },
    Stairs { floor: usize, position: Vec2 },
    Looted,
    Healed(f32),
    Generator { running: bool },
}
