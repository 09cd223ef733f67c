//! Alert propagation and stand-down

use glam::Vec2;

use crate::ai::agent::{Agent, AgentState};
use crate::core::config::AgentConfig;
use crate::core::types::FloorPoint;

impl Agent {
    /// Alert toward a point on the agent's current floor
    pub fn alert(&mut self, position: Vec2, level: u8, gunshot: bool, config: &AgentConfig) {
        self.alert_at(FloorPoint::new(position, self.current_floor), level, gunshot, config);
    }

    /// Raise awareness toward `point`.
    ///
    /// A lower level is ignored while the agent is engaged (chase, attack
    /// or hunting). Level and timer only ever go up. The investigation is
    /// replaced when the point moved far enough or the level rose; an
    /// attacking agent keeps attacking.
    pub fn alert_at(&mut self, point: FloorPoint, level: u8, gunshot: bool, config: &AgentConfig) {
        let level = level.min(2);
        let engaged = matches!(self.state, AgentState::Chase | AgentState::Attack) || self.alert_level == 2;
        if level < self.alert_level && engaged {
            return;
        }

        let previous = self.alert_level;
        self.alert_level = self.alert_level.max(level);
        let duration = if gunshot {
            config.gunshot_alert_secs
        } else {
            config.alert_secs
        };
        self.alert_timer = self.alert_timer.max(duration);

        let raised = self.alert_level > previous;
        let point = self.reachable(point);
        let redirected = self.investigation_point.map_or(true, |current| {
            current.floor != point.floor
                || current.position.distance(point.position) > config.investigation_redirect_distance
        });
        if !(raised || redirected) || self.state == AgentState::Attack {
            return;
        }

        tracing::trace!(agent = self.id.0, level = self.alert_level, gunshot, "alerted");
        self.begin_investigation(point);
    }

    /// Outdoor agents cannot reach upper floors; search below instead
    fn reachable(&self, point: FloorPoint) -> FloorPoint {
        if self.building.is_none() && point.floor > 0 {
            FloorPoint::ground(point.position)
        } else {
            point
        }
    }

    /// Switch to alert toward `point`; sub-points are planned next tick
    pub(crate) fn begin_investigation(&mut self, point: FloorPoint) {
        self.investigation_point = Some(point);
        self.investigation_sub_points.clear();
        self.sub_point_index = 0;
        self.needs_investigation_plan = true;
        self.clear_path();
        self.set_state(AgentState::Alert);
    }

    /// Count down the alert timer; an idle or searching agent whose timer
    /// ran out forgets the investigation and resumes patrol
    pub(crate) fn decay_alert(&mut self, dt: f32) {
        self.alert_timer = (self.alert_timer - dt).max(0.0);
        if self.alert_timer <= 0.0
            && self.alert_level > 0
            && matches!(self.state, AgentState::Alert | AgentState::Idle)
        {
            self.stand_down();
        }
    }

    pub(crate) fn stand_down(&mut self) {
        self.alert_level = 0;
        self.investigation_point = None;
        self.investigation_sub_points.clear();
        self.sub_point_index = 0;
        self.needs_investigation_plan = false;
        self.last_known_player = None;
        self.clear_path();
        self.set_state(AgentState::Patrol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::agent_at;
    use crate::ai::variant::AgentVariant;

    fn agent() -> Agent {
        agent_at(AgentVariant::Rifleman, Vec2::ZERO)
    }

    #[test]
    fn test_alert_from_patrol() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.alert(Vec2::new(300.0, 0.0), 1, false, &config);
        assert_eq!(a.state, AgentState::Alert);
        assert_eq!(a.alert_level, 1);
        assert_eq!(a.alert_timer, config.alert_secs);
        assert!(a.needs_investigation_plan);
    }

    #[test]
    fn test_gunshot_timer_longer() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.alert(Vec2::new(300.0, 0.0), 1, true, &config);
        assert_eq!(a.alert_timer, config.gunshot_alert_secs);
    }

    #[test]
    fn test_lower_alert_ignored_while_engaged() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.state = AgentState::Chase;
        a.alert_level = 2;
        a.alert_timer = 5.0;
        a.alert(Vec2::new(300.0, 0.0), 1, true, &config);
        assert_eq!(a.state, AgentState::Chase);
        assert_eq!(a.alert_timer, 5.0);
    }

    #[test]
    fn test_attack_not_interrupted() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.state = AgentState::Attack;
        a.alert_level = 1;
        a.alert(Vec2::new(300.0, 0.0), 2, true, &config);
        assert_eq!(a.state, AgentState::Attack);
        assert_eq!(a.alert_level, 2);
    }

    #[test]
    fn test_nearby_repeat_does_not_reset_search() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.alert(Vec2::new(300.0, 0.0), 1, false, &config);
        a.needs_investigation_plan = false;
        a.sub_point_index = 2;
        a.alert(Vec2::new(340.0, 0.0), 1, false, &config);
        assert_eq!(a.sub_point_index, 2);
        a.alert(Vec2::new(600.0, 0.0), 1, false, &config);
        assert_eq!(a.sub_point_index, 0);
        assert_eq!(a.investigation_point.unwrap().position, Vec2::new(600.0, 0.0));
    }

    #[test]
    fn test_outdoor_agent_searches_ground() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.alert_at(FloorPoint::new(Vec2::new(50.0, 0.0), 2), 1, false, &config);
        assert_eq!(a.investigation_point.unwrap().floor, 0);
    }

    #[test]
    fn test_stand_down_after_timer() {
        let config = AgentConfig::default();
        let mut a = agent();
        a.alert(Vec2::new(300.0, 0.0), 1, false, &config);
        a.decay_alert(config.alert_secs - 1.0);
        assert_eq!(a.state, AgentState::Alert);
        a.decay_alert(1.5);
        assert_eq!(a.state, AgentState::Patrol);
        assert_eq!(a.alert_level, 0);
        assert!(a.investigation_point.is_none());
    }
}
