//! Frame orchestration and HUD snapshots

pub mod snapshot;
pub mod tick;

pub use snapshot::{AgentSnapshot, PlayerSnapshot, Snapshot};
pub use tick::{Simulation, SimulationEvent};
