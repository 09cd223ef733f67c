pub mod config;
pub mod error;
pub mod types;

pub use config::{config, set_config, Heuristic, SimulationConfig};
pub use error::{Result, SkulkError};
pub use types::{AgentId, BuildingId, ChunkCoord, FloorPoint, SettlementId};
