//! Attack behaviour for ranged and melee variants

use glam::Vec2;

use crate::ai::agent::{Agent, AgentState};
use crate::ai::context::{AgentContext, AgentOutcome, ShotRequest};
use crate::ai::variant::AttackStyle;
use crate::core::config::AgentConfig;

/// Gap between the agent's edge and a spawned projectile
const MUZZLE_OFFSET: f32 = 4.0;
/// Melee agents stop closing in at this fraction of their reach
const MELEE_STANDOFF: f32 = 0.8;

impl Agent {
    /// Enter attack, arming a randomised first-shot delay
    pub(crate) fn enter_attack(&mut self, config: &AgentConfig) {
        if self.state == AgentState::Attack {
            return;
        }
        self.timers.attack = self.random_between(config.attack_delay_min, config.attack_delay_max);
        self.clear_path();
        self.set_state(AgentState::Attack);
    }

    pub(crate) fn attack(&mut self, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) {
        let Some(target) = self.last_known_player else {
            self.go_idle(ctx.config);
            return;
        };
        let profile = self.profile();
        let to_target = target.position - self.position();
        let distance = to_target.length();
        let heading = to_target.normalize_or_zero();
        if heading != Vec2::ZERO {
            self.view_direction = heading;
        }

        match profile.style {
            AttackStyle::Ranged => {
                self.body.velocity = Vec2::ZERO;
                if self.timers.attack <= 0.0 {
                    outcome.shot = Some(ShotRequest {
                        origin: self.position() + heading * (self.body.size * 0.5 + MUZZLE_OFFSET),
                        direction: heading,
                        damage: profile.damage,
                        floor: self.current_floor,
                    });
                    self.timers.attack = profile.attack_cooldown;
                    tracing::trace!(agent = self.id.0, "fired");
                }
            }
            AttackStyle::Melee => {
                self.body.velocity = if distance > profile.attack_range * MELEE_STANDOFF {
                    heading * profile.chase_speed
                } else {
                    Vec2::ZERO
                };
                if self.timers.attack <= 0.0 && distance <= profile.attack_range {
                    outcome.melee_damage = Some(profile.damage);
                    self.timers.attack = profile.attack_cooldown;
                }
            }
        }
    }
}
