//! Agent AI: a per-agent state machine over patrol, chase, attack, alert
//! and idle, driven once per tick by perception then behaviour

pub mod agent;
pub mod alert;
pub mod combat;
pub mod context;
pub mod controller;
pub mod investigation;
pub mod navigation;
pub mod perception;
pub mod steering;
pub mod variant;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{Agent, AgentState, AgentTimers};
pub use context::{AgentContext, AgentOutcome, DoorRequest, PlayerView, ShotRequest};
pub use navigation::PathProgress;
pub use variant::{AgentVariant, AttackStyle, VariantProfile};
