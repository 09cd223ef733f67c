//! Per-variant behaviour table

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Stands still and fires projectiles
    Ranged,
    /// Closes distance and hits directly
    Melee,
}

/// Static stats shared by every agent of one variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantProfile {
    pub max_health: f32,
    pub speed: f32,
    pub chase_speed: f32,
    pub size: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub damage: f32,
    pub style: AttackStyle,
}

const RIFLEMAN: VariantProfile = VariantProfile {
    max_health: 100.0,
    speed: 80.0,
    chase_speed: 140.0,
    size: 24.0,
    attack_range: 280.0,
    attack_cooldown: 1.2,
    damage: 12.0,
    style: AttackStyle::Ranged,
};

const HEAVY: VariantProfile = VariantProfile {
    max_health: 180.0,
    speed: 60.0,
    chase_speed: 105.0,
    size: 30.0,
    attack_range: 320.0,
    attack_cooldown: 1.8,
    damage: 22.0,
    style: AttackStyle::Ranged,
};

const CHARGER: VariantProfile = VariantProfile {
    max_health: 70.0,
    speed: 100.0,
    chase_speed: 200.0,
    size: 22.0,
    attack_range: 40.0,
    attack_cooldown: 0.9,
    damage: 18.0,
    style: AttackStyle::Melee,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentVariant {
    Rifleman,
    Heavy,
    Charger,
}

impl AgentVariant {
    pub fn profile(&self) -> &'static VariantProfile {
        match self {
            AgentVariant::Rifleman => &RIFLEMAN,
            AgentVariant::Heavy => &HEAVY,
            AgentVariant::Charger => &CHARGER,
        }
    }

    /// Spawn roll, weighted 70/15/15
    pub fn roll(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..100) {
            0..=69 => AgentVariant::Rifleman,
            70..=84 => AgentVariant::Heavy,
            _ => AgentVariant::Charger,
        }
    }
}
