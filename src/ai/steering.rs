//! Local separation between agents

use glam::Vec2;

use crate::ai::agent::{Agent, AgentState};
use crate::ai::context::AgentContext;

impl Agent {
    /// Push away from same-floor neighbours inside the separation radius.
    /// The push grows as neighbours get closer and never exceeds walking
    /// speed. Attacking agents hold their ground.
    pub(crate) fn apply_separation(&mut self, ctx: &AgentContext<'_>) {
        if self.state == AgentState::Attack {
            return;
        }
        let config = ctx.config;
        let radius = config.separation_radius;
        let position = self.position();

        let mut push = Vec2::ZERO;
        for ((id, floor), other) in ctx.neighbors.query_radius(position, radius) {
            if id == self.id || floor != self.current_floor {
                continue;
            }
            let offset = position - other;
            let distance = offset.length();
            if distance >= radius {
                continue;
            }
            // Coincident agents split along an id-derived direction
            let away = if distance > f32::EPSILON {
                offset / distance
            } else {
                Vec2::from_angle(self.id.0 as f32)
            };
            push += away * (config.separation_strength * radius / distance.max(1.0));
        }

        self.body.velocity += push.clamp_length_max(self.profile().speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::{absent_player, agent_at, open_los, Fixture};
    use crate::ai::variant::AgentVariant;
    use crate::core::types::AgentId;

    #[test]
    fn test_pushes_away_from_neighbour() {
        let mut fixture = Fixture::new();
        fixture.neighbors.insert((AgentId(1), 0), Vec2::ZERO);
        fixture.neighbors.insert((AgentId(2), 0), Vec2::new(20.0, 0.0));
        let ctx = fixture.context(absent_player(), &open_los);

        let mut a = agent_at(AgentVariant::Rifleman, Vec2::ZERO);
        a.apply_separation(&ctx);
        assert!(a.body.velocity.x < 0.0);
        assert!(a.body.velocity.length() <= a.profile().speed + 1e-3);
    }

    #[test]
    fn test_ignores_other_floors_and_far_agents() {
        let mut fixture = Fixture::new();
        fixture.neighbors.insert((AgentId(2), 1), Vec2::new(10.0, 0.0));
        fixture.neighbors.insert((AgentId(3), 0), Vec2::new(100.0, 0.0));
        let ctx = fixture.context(absent_player(), &open_los);

        let mut a = agent_at(AgentVariant::Rifleman, Vec2::ZERO);
        a.apply_separation(&ctx);
        assert_eq!(a.body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_attacking_agent_holds_ground() {
        let mut fixture = Fixture::new();
        fixture.neighbors.insert((AgentId(2), 0), Vec2::new(10.0, 0.0));
        let ctx = fixture.context(absent_player(), &open_los);

        let mut a = agent_at(AgentVariant::Rifleman, Vec2::ZERO);
        a.state = AgentState::Attack;
        a.apply_separation(&ctx);
        assert_eq!(a.body.velocity, Vec2::ZERO);
    }
}
