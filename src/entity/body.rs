//! Shared movement and collision capability for every moving entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::spatial::geometry::Rect;
use crate::world::obstacles::Obstacle;

/// Gap kept between a body and the obstacle it was pushed out of
const SKIN: f32 = 0.01;

/// Square body with a velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
}

impl Body {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, Vec2::splat(self.size))
    }

    fn rect_at(&self, position: Vec2) -> Rect {
        Rect::new(position, Vec2::splat(self.size))
    }

    /// Integrate velocity and resolve against movement-blocking obstacles.
    ///
    /// Axes are resolved separately (x, then y) so a body sliding along a
    /// wall keeps its tangential motion. Returns the actual displacement.
    pub fn move_and_collide<'a>(&mut self, dt: f32, obstacles: impl IntoIterator<Item = &'a Obstacle>) -> Vec2 {
        let start = self.position;
        let delta = self.velocity * dt;
        if delta == Vec2::ZERO {
            return Vec2::ZERO;
        }

        // Broadphase: only obstacles touching the swept box matter
        let swept = self.rect().union(&self.rect_at(start + delta)).expanded(1.0);
        let nearby: Vec<Rect> = obstacles
            .into_iter()
            .filter(|o| o.blocks_movement() && o.rect.intersects(&swept))
            .map(|o| o.rect)
            .collect();

        let half = self.size * 0.5;

        self.position.x += delta.x;
        for rect in &nearby {
            if self.rect().intersects(rect) {
                if delta.x > 0.0 {
                    self.position.x = rect.min().x - half - SKIN;
                } else {
                    self.position.x = rect.max().x + half + SKIN;
                }
            }
        }

        self.position.y += delta.y;
        for rect in &nearby {
            if self.rect().intersects(rect) {
                if delta.y > 0.0 {
                    self.position.y = rect.min().y - half - SKIN;
                } else {
                    self.position.y = rect.max().y + half + SKIN;
                }
            }
        }

        self.position - start
    }
}
