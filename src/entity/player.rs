//! The player-controlled entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::config::PlayerConfig;
use crate::core::types::{BuildingId, FloorPoint, SettlementId};
use crate::entity::body::Body;
use crate::spatial::geometry::Rect;
use crate::spatial::SpatialQuery;

/// Per-frame input consumed from the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement axes, each in [-1, 1]
    pub movement: Vec2,
    /// Aim direction; falls back to the facing direction when zero
    pub aim: Vec2,
    pub sneak: bool,
    pub dash: bool,
    pub attack: bool,
    pub interact: bool,
}

/// What the player asked for this frame beyond movement
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Direction of a shot fired this frame
    pub fire: Option<Vec2>,
    pub interact: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    pub floor: usize,
    /// Settlement whose building the player is inside, if any
    pub settlement: Option<SettlementId>,
    pub building: Option<BuildingId>,
    pub facing: Vec2,
    pub sneaking: bool,
    pub ammo: u32,
    pub score: u32,
    dash_timer: f32,
    dash_cooldown: f32,
    fire_cooldown: f32,
}

impl Player {
    pub fn new(position: Vec2, config: &PlayerConfig) -> Self {
        Self {
            body: Body::new(position, config.size),
            health: config.max_health,
            max_health: config.max_health,
            floor: 0,
            settlement: None,
            building: None,
            facing: Vec2::X,
            sneaking: false,
            ammo: config.starting_ammo,
            score: 0,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            fire_cooldown: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn floor_point(&self) -> FloorPoint {
        FloorPoint::new(self.body.position, self.floor)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Apply damage; returns true if this hit killed the player
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        !self.is_alive()
    }

    /// Heal up to max health; returns the amount actually restored
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    pub fn move_to_floor(&mut self, floor: usize, position: Vec2) {
        self.floor = floor;
        self.body.position = position;
        self.body.velocity = Vec2::ZERO;
    }

    /// Multiplier applied to enemy detection radius
    pub fn detection_multiplier(&self, sneak_factor: f32) -> f32 {
        if self.sneaking {
            sneak_factor
        } else {
            1.0
        }
    }

    /// Turn input into velocity and intents, advancing cooldowns
    pub fn apply_input(&mut self, input: &PlayerInput, dt: f32, config: &PlayerConfig) -> PlayerIntent {
        self.dash_timer = (self.dash_timer - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        if !self.is_alive() {
            self.body.velocity = Vec2::ZERO;
            return PlayerIntent::default();
        }

        self.sneaking = input.sneak;
        let direction = input.movement.clamp_length_max(1.0);
        if direction != Vec2::ZERO {
            self.facing = direction.normalize_or_zero();
        }

        if input.dash && self.dash_cooldown <= 0.0 && direction != Vec2::ZERO {
            self.dash_timer = config.dash_duration;
            self.dash_cooldown = config.dash_cooldown;
        }

        let mut speed = config.speed;
        if self.is_dashing() {
            speed *= config.dash_multiplier;
        } else if self.sneaking {
            speed *= config.sneak_multiplier;
        }
        self.body.velocity = direction * speed;

        let mut intent = PlayerIntent {
            fire: None,
            interact: input.interact,
        };
        if input.attack && self.fire_cooldown <= 0.0 && self.ammo > 0 {
            let aim = input.aim.normalize_or_zero();
            let aim = if aim == Vec2::ZERO { self.facing } else { aim };
            self.facing = aim;
            self.ammo -= 1;
            self.fire_cooldown = config.fire_cooldown;
            intent.fire = Some(aim);
        }
        intent
    }
}

impl SpatialQuery for Player {
    fn rect_data(&self) -> Rect {
        self.body.rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::ZERO, &PlayerConfig::default())
    }

    #[test]
    fn test_sneak_slows_and_dash_speeds_up() {
        let config = PlayerConfig::default();
        let mut p = player();
        let walk = PlayerInput { movement: Vec2::X, ..Default::default() };
        p.apply_input(&walk, 0.016, &config);
        let walking = p.body.velocity.length();

        p.apply_input(&PlayerInput { sneak: true, ..walk }, 0.016, &config);
        assert!((p.body.velocity.length() - walking * config.sneak_multiplier).abs() < 1e-3);

        p.apply_input(&PlayerInput { dash: true, ..walk }, 0.016, &config);
        assert!((p.body.velocity.length() - walking * config.dash_multiplier).abs() < 1e-3);
    }

    #[test]
    fn test_fire_consumes_ammo_and_respects_cooldown() {
        let config = PlayerConfig::default();
        let mut p = player();
        let ammo = p.ammo;
        let shoot = PlayerInput { attack: true, aim: Vec2::Y, ..Default::default() };

        let first = p.apply_input(&shoot, 0.016, &config);
        assert_eq!(first.fire, Some(Vec2::Y));
        assert_eq!(p.ammo, ammo - 1);

        let second = p.apply_input(&shoot, 0.016, &config);
        assert!(second.fire.is_none());
    }

    #[test]
    fn test_no_ammo_no_shot() {
        let config = PlayerConfig::default();
        let mut p = player();
        p.ammo = 0;
        let intent = p.apply_input(&PlayerInput { attack: true, ..Default::default() }, 0.016, &config);
        assert!(intent.fire.is_none());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut p = player();
        p.take_damage(30.0);
        assert_eq!(p.heal(50.0), 30.0);
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn test_death_reported_once() {
        let mut p = player();
        assert!(p.take_damage(500.0));
        assert!(!p.take_damage(10.0));
        assert!(!p.is_alive());
    }
}
