//! The streamed procedural world
//!
//! - `obstacles`: walls, doors, stairs, props and tree trunks
//! - `noise`: chunk seeding and biome noise
//! - `chunk`: per-chunk content (settlement, trees, decorations)
//! - `settlement`: buildings plus the agents guarding them
//! - `manager`: chunk lifecycle around the player

pub mod chunk;
pub mod manager;
pub mod noise;
pub mod obstacles;
pub mod settlement;

pub use chunk::{generate_chunk_content, Chunk, ChunkContent, Decoration, DecorationKind, Tree};
pub use manager::WorldManager;
pub use obstacles::{InteractableKind, Obstacle, ObstacleId, ObstacleKind, ObstacleSet, StairLink};
pub use settlement::{Settlement, SettlementEvent};
