//! Agent state
//!
//! Behaviour lives in the sibling modules as further `impl Agent` blocks:
//! perception, alerting, investigation, navigation, steering, combat, and
//! the per-tick controller that sequences them.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::variant::{AgentVariant, VariantProfile};
use crate::core::config::AgentConfig;
use crate::core::types::{AgentId, BuildingId, FloorPoint};
use crate::entity::body::Body;
use crate::spatial::geometry::Rect;
use crate::spatial::SpatialQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    Patrol,
    Chase,
    Attack,
    Alert,
    Idle,
}

impl AgentState {
    pub fn name(&self) -> &'static str {
        match self {
            AgentState::Patrol => "patrol",
            AgentState::Chase => "chase",
            AgentState::Attack => "attack",
            AgentState::Alert => "alert",
            AgentState::Idle => "idle",
        }
    }
}

/// Countdown timers, all in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentTimers {
    pub path_cooldown: f32,
    pub idle: f32,
    pub attack: f32,
    pub door_cooldown: f32,
}

impl AgentTimers {
    pub fn tick(&mut self, dt: f32) {
        self.path_cooldown = (self.path_cooldown - dt).max(0.0);
        self.idle = (self.idle - dt).max(0.0);
        self.attack = (self.attack - dt).max(0.0);
        self.door_cooldown = (self.door_cooldown - dt).max(0.0);
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub variant: AgentVariant,
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    pub state: AgentState,
    /// 0 none, 1 suspicious, 2 hunting
    pub alert_level: u8,
    pub alert_timer: f32,

    /// Cyclic patrol route
    pub patrol_path: Vec<FloorPoint>,
    pub patrol_index: usize,
    pub current_path: Option<Vec<FloorPoint>>,
    pub current_waypoint_index: usize,
    /// Destination the current path was computed for
    pub path_target: Option<FloorPoint>,

    pub investigation_point: Option<FloorPoint>,
    pub investigation_sub_points: Vec<FloorPoint>,
    pub sub_point_index: usize,
    /// Sub-points are generated on the next tick that has obstacle access
    pub(crate) needs_investigation_plan: bool,

    pub view_direction: Vec2,
    pub detection_radius: f32,
    pub field_of_view: f32,

    /// Non-owning handle into the settlement's buildings
    pub building: Option<BuildingId>,
    pub current_floor: usize,

    pub last_known_player: Option<FloorPoint>,
    /// Set while the player is (or was last tick) in sight
    pub(crate) tracking_player: bool,

    pub timers: AgentTimers,
    /// Position at the start of the previous movement step
    pub(crate) last_position: Vec2,
    /// Displacement the previous tick's velocity should have produced
    pub(crate) expected_step: f32,
    pub(crate) rng: ChaCha8Rng,
}

impl Agent {
    pub fn new(
        id: AgentId,
        variant: AgentVariant,
        start: FloorPoint,
        building: Option<BuildingId>,
        patrol_path: Vec<FloorPoint>,
        seed: u64,
        config: &AgentConfig,
    ) -> Self {
        let profile = variant.profile();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let view_direction = Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU));
        Self {
            id,
            variant,
            body: Body::new(start.position, profile.size),
            health: profile.max_health,
            max_health: profile.max_health,
            state: AgentState::Patrol,
            alert_level: 0,
            alert_timer: 0.0,
            patrol_path,
            patrol_index: 0,
            current_path: None,
            current_waypoint_index: 0,
            path_target: None,
            investigation_point: None,
            investigation_sub_points: Vec::new(),
            sub_point_index: 0,
            needs_investigation_plan: false,
            view_direction,
            detection_radius: config.detection_radius,
            field_of_view: config.field_of_view,
            building,
            current_floor: start.floor,
            last_known_player: None,
            tracking_player: false,
            timers: AgentTimers::default(),
            last_position: start.position,
            expected_step: 0.0,
            rng,
        }
    }

    pub fn profile(&self) -> &'static VariantProfile {
        self.variant.profile()
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn floor_point(&self) -> FloorPoint {
        FloorPoint::new(self.body.position, self.current_floor)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Apply damage from `source`. The hit raises the agent to hunting
    /// alert toward the source. Returns true if this hit killed the agent.
    pub fn take_damage(&mut self, amount: f32, source: FloorPoint, config: &AgentConfig) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        if self.is_alive() {
            self.alert_at(source, 2, true, config);
        }
        !self.is_alive()
    }

    pub(crate) fn set_state(&mut self, state: AgentState) {
        if self.state != state {
            tracing::trace!(agent = self.id.0, from = self.state.name(), to = state.name(), "state change");
            self.state = state;
        }
    }

    pub(crate) fn clear_path(&mut self) {
        self.current_path = None;
        self.current_waypoint_index = 0;
        self.path_target = None;
    }

    pub(crate) fn random_between(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }

    /// Park in idle for a randomised short time
    pub(crate) fn go_idle(&mut self, config: &AgentConfig) {
        self.timers.idle = self.random_between(config.idle_retry_min, config.idle_retry_max);
        self.body.velocity = Vec2::ZERO;
        self.clear_path();
        self.set_state(AgentState::Idle);
    }
}

impl SpatialQuery for Agent {
    fn rect_data(&self) -> Rect {
        self.body.rect()
    }
}
