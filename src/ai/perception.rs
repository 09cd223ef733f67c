//! Player detection

use glam::Vec2;

use crate::ai::agent::{Agent, AgentState};
use crate::ai::context::{AgentContext, AgentOutcome};
use crate::spatial::geometry::angle_between;

impl Agent {
    /// True when the player is within detection radius, inside the view
    /// cone, and not hidden behind an obstacle. All three must hold.
    pub fn detect_player(&self, ctx: &AgentContext<'_>) -> bool {
        let view = &ctx.player;
        if !view.alive || !view.shares_space(self.building, self.current_floor) {
            return false;
        }

        let to_player = view.position - self.position();
        let distance = to_player.length();
        if distance > self.detection_radius * view.detection_multiplier {
            return false;
        }
        if distance > f32::EPSILON && angle_between(self.view_direction, to_player) > self.field_of_view * 0.5 {
            return false;
        }
        ctx.clear_line(self.building, self.current_floor, self.position(), view.position)
    }

    /// Perception step: react to seeing or losing the player
    pub(crate) fn perceive(&mut self, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) {
        if self.detect_player(ctx) {
            let target = ctx.player.floor_point();
            let to_player = target.position - self.position();
            if to_player != Vec2::ZERO {
                self.view_direction = to_player.normalize();
            }

            self.alert_level = 2;
            self.alert_timer = ctx.config.seen_alert_secs;
            self.last_known_player = Some(target);
            self.investigation_point = None;
            self.investigation_sub_points.clear();
            self.needs_investigation_plan = false;

            if !self.tracking_player {
                self.tracking_player = true;
                outcome.sighted = Some(target);
                tracing::trace!(agent = self.id.0, "spotted player");
            }

            if to_player.length() <= self.profile().attack_range {
                self.enter_attack(ctx.config);
            } else if self.state != AgentState::Chase {
                self.clear_path();
                self.set_state(AgentState::Chase);
            }
        } else if self.tracking_player {
            self.tracking_player = false;
            self.alert_level = 1;
            self.alert_timer = ctx.config.lost_alert_secs;
            tracing::trace!(agent = self.id.0, "lost sight of player");
            match self.last_known_player {
                Some(last) => self.begin_investigation(last),
                None => self.go_idle(ctx.config),
            }
        }
    }
}
