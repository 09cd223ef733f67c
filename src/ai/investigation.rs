//! Searching around an investigation point

use glam::Vec2;
use rand::Rng;

use crate::ai::agent::Agent;
use crate::ai::context::AgentContext;
use crate::core::types::FloorPoint;
use crate::world::obstacles::point_blocked;

impl Agent {
    /// Set the point to search and scatter 3-4 jittered sub-points around
    /// it, dropping any that land inside an obstacle or outside the search
    /// area. Returns false when no candidate survived.
    pub fn set_investigation_point(&mut self, point: FloorPoint, ctx: &AgentContext<'_>) -> bool {
        self.investigation_point = Some(point);
        self.sub_point_index = 0;
        self.needs_investigation_plan = false;
        self.clear_path();

        let bounds = ctx.search_bounds(self.building, point.floor);
        let count = self.rng.gen_range(3..=4);
        let mut sub_points = Vec::with_capacity(count);
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = self.random_between(ctx.config.investigation_min_radius, ctx.config.investigation_max_radius);
            let candidate = point.position + Vec2::from_angle(angle) * radius;
            if bounds.contains(candidate) && !point_blocked(candidate, ctx.obstacles(self.building, point.floor)) {
                sub_points.push(FloorPoint::new(candidate, point.floor));
            }
        }

        if sub_points.is_empty() {
            tracing::trace!(agent = self.id.0, "no valid investigation sub-points");
        }
        self.investigation_sub_points = sub_points;
        !self.investigation_sub_points.is_empty()
    }

    pub fn current_sub_point(&self) -> Option<FloorPoint> {
        self.investigation_sub_points.get(self.sub_point_index).copied()
    }
}
