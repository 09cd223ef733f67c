//! Per-tick agent update
//!
//! Order within a tick: timers and alert decay, perception, the current
//! state's behaviour (which includes the door check while following a
//! path), then separation.

use glam::Vec2;

use crate::ai::agent::{Agent, AgentState};
use crate::ai::context::{AgentContext, AgentOutcome};
use crate::ai::navigation::PathProgress;

/// View sweep speed while looking around (radians per second)
const LOOK_AROUND_RATE: f32 = 1.2;

impl Agent {
    /// Advance the agent's AI by `dt` seconds.
    ///
    /// Sets velocity but does not move the body; the owner resolves
    /// movement against obstacles and applies the returned side effects.
    pub fn update(&mut self, dt: f32, ctx: &AgentContext<'_>) -> AgentOutcome {
        let mut outcome = AgentOutcome::default();
        if !self.is_alive() {
            self.body.velocity = Vec2::ZERO;
            return outcome;
        }

        self.timers.tick(dt);
        self.decay_alert(dt);
        self.perceive(ctx, &mut outcome);

        match self.state {
            AgentState::Patrol => self.patrol(ctx, &mut outcome),
            AgentState::Chase => self.chase(ctx, &mut outcome),
            AgentState::Attack => self.attack(ctx, &mut outcome),
            AgentState::Alert => self.investigate(ctx, &mut outcome),
            AgentState::Idle => self.idle(dt, ctx),
        }

        if outcome.door.is_none() {
            self.apply_separation(ctx);
        }

        self.last_position = self.position();
        self.expected_step = self.body.velocity.length() * dt;
        outcome
    }

    fn patrol(&mut self, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) {
        let Some(target) = self.patrol_path.get(self.patrol_index).copied() else {
            self.body.velocity = Vec2::ZERO;
            return;
        };

        if self.current_path.is_none() {
            if target.floor == self.current_floor
                && self.position().distance(target.position) <= ctx.config.waypoint_reach_distance
            {
                self.patrol_index = (self.patrol_index + 1) % self.patrol_path.len();
                return;
            }
            if self.timers.path_cooldown > 0.0 {
                self.body.velocity = Vec2::ZERO;
                return;
            }
            if !self.request_path(target, ctx) {
                self.go_idle(ctx.config);
                return;
            }
        }

        if self.follow_path(self.profile().speed, ctx, outcome) == PathProgress::Arrived {
            self.patrol_index = (self.patrol_index + 1) % self.patrol_path.len();
        }
    }

    fn chase(&mut self, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) {
        let Some(target) = self.last_known_player else {
            self.go_idle(ctx.config);
            return;
        };

        let threshold = ctx.config.repath_distance_cells * ctx.grid_size;
        let stale = self.path_target.map_or(true, |current| {
            current.floor != target.floor || current.position.distance(target.position) > threshold
        });
        if (self.current_path.is_none() || stale) && self.timers.path_cooldown <= 0.0 && !self.request_path(target, ctx) {
            self.go_idle(ctx.config);
            return;
        }

        let speed = self.profile().chase_speed;
        if self.current_path.is_some() {
            if self.follow_path(speed, ctx, outcome) == PathProgress::Arrived {
                self.steer_toward(target.position, speed);
            }
        } else if target.floor == self.current_floor {
            // Waiting out the path cooldown; the player is in sight
            self.steer_toward(target.position, speed);
        } else {
            self.body.velocity = Vec2::ZERO;
        }
    }

    /// Alert state: walk the investigation sub-points one by one
    fn investigate(&mut self, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) {
        if self.needs_investigation_plan {
            let Some(point) = self.investigation_point else {
                self.go_idle(ctx.config);
                return;
            };
            if !self.set_investigation_point(point, ctx) {
                self.go_idle(ctx.config);
                return;
            }
        }

        let Some(target) = self.current_sub_point() else {
            self.go_idle(ctx.config);
            return;
        };

        if self.current_path.is_none() {
            if self.timers.path_cooldown > 0.0 {
                self.body.velocity = Vec2::ZERO;
                return;
            }
            if !self.request_path(target, ctx) {
                self.sub_point_index += 1;
                self.go_idle(ctx.config);
                return;
            }
        }

        let speed = if self.alert_level >= 2 {
            self.profile().chase_speed
        } else {
            self.profile().speed
        };
        if self.follow_path(speed, ctx, outcome) == PathProgress::Arrived {
            self.sub_point_index += 1;
            // Pause and look around before the next sub-point
            self.go_idle(ctx.config);
        }
    }

    /// Stand still; on timer expiry move on to the next sub-point, keep
    /// looking around while alert, or return to patrol
    fn idle(&mut self, dt: f32, ctx: &AgentContext<'_>) {
        self.body.velocity = Vec2::ZERO;
        if self.alert_level > 0 {
            self.view_direction = Vec2::from_angle(LOOK_AROUND_RATE * dt).rotate(self.view_direction);
        }
        if self.timers.idle > 0.0 {
            return;
        }

        if self.alert_level == 0 {
            self.set_state(AgentState::Patrol);
            return;
        }
        if self.investigation_point.is_some() && self.needs_investigation_plan {
            self.set_state(AgentState::Alert);
            return;
        }
        match self.current_sub_point() {
            Some(target) => {
                if self.request_path(target, ctx) {
                    self.set_state(AgentState::Alert);
                } else {
                    self.sub_point_index += 1;
                    self.go_idle(ctx.config);
                }
            }
            // Nothing left to search; wait for the alert to run out
            None => self.go_idle(ctx.config),
        }
    }
}
