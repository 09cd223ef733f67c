//! Skulk - simulation core of a top-down stealth game
//!
//! Agent AI over a grid pathfinder, procedurally generated multi-floor
//! buildings, and a chunk-streamed world. Rendering and input live outside
//! the crate; everything here is synchronous and single-threaded.

pub mod ai;
pub mod core;
pub mod entity;
pub mod pathfinding;
pub mod simulation;
pub mod spatial;
pub mod structures;
pub mod world;
