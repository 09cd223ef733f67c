//! Items dropped into the world by interactions

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::player::Player;
use crate::spatial::geometry::Rect;
use crate::spatial::SpatialQuery;

const PICKUP_SIZE: f32 = 16.0;
const MEDKIT_PICKUP_HEAL: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Ammo(u32),
    Medkit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub position: Vec2,
    pub floor: usize,
    pub kind: PickupKind,
}

impl Pickup {
    pub fn new(position: Vec2, floor: usize, kind: PickupKind) -> Self {
        Self { position, floor, kind }
    }

    /// Collect on contact; returns true when the pickup was consumed
    pub fn try_collect(&self, player: &mut Player) -> bool {
        if player.floor != self.floor || !player.body.rect().intersects(&self.rect_data()) {
            return false;
        }
        match self.kind {
            PickupKind::Ammo(amount) => player.ammo += amount,
            PickupKind::Medkit => {
                player.heal(MEDKIT_PICKUP_HEAL);
            }
        }
        true
    }
}

impl SpatialQuery for Pickup {
    fn rect_data(&self) -> Rect {
        Rect::new(self.position, Vec2::splat(PICKUP_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PlayerConfig;

    #[test]
    fn test_collect_ammo_on_contact() {
        let mut player = Player::new(Vec2::ZERO, &PlayerConfig::default());
        let ammo = player.ammo;
        let pickup = Pickup::new(Vec2::new(5.0, 0.0), 0, PickupKind::Ammo(6));
        assert!(pickup.try_collect(&mut player));
        assert_eq!(player.ammo, ammo + 6);
    }

    #[test]
    fn test_other_floor_not_collected() {
        let mut player = Player::new(Vec2::ZERO, &PlayerConfig::default());
        let pickup = Pickup::new(Vec2::ZERO, 1, PickupKind::Medkit);
        assert!(!pickup.try_collect(&mut player));
    }
}
