//! Core type definitions used throughout the codebase

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for an agent, unique within its settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Index of a building inside its settlement (non-owning handle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

impl BuildingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Integer coordinate of a world chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing a world position
    pub fn from_world(pos: Vec2, chunk_size: f32) -> Self {
        Self {
            x: (pos.x / chunk_size).floor() as i32,
            y: (pos.y / chunk_size).floor() as i32,
        }
    }

    /// World-space position of the chunk's minimum corner
    pub fn origin(&self, chunk_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * chunk_size, self.y as f32 * chunk_size)
    }

    /// Chebyshev distance in chunks
    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Settlements are keyed by the chunk that owns them
pub type SettlementId = ChunkCoord;

/// A world position on a specific floor.
///
/// Floor 0 is the ground level shared by the outdoors and every building's
/// ground floor; higher floors only exist inside a building.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorPoint {
    pub position: Vec2,
    pub floor: usize,
}

impl FloorPoint {
    pub const fn new(position: Vec2, floor: usize) -> Self {
        Self { position, floor }
    }

    pub const fn ground(position: Vec2) -> Self {
        Self { position, floor: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_from_world_negative() {
        assert_eq!(ChunkCoord::from_world(Vec2::new(-1.0, 5.0), 100.0), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world(Vec2::new(250.0, -250.0), 100.0), ChunkCoord::new(2, -3));
    }

    #[test]
    fn test_chunk_origin_roundtrip() {
        let coord = ChunkCoord::new(-3, 4);
        let origin = coord.origin(64.0);
        assert_eq!(ChunkCoord::from_world(origin + Vec2::splat(1.0), 64.0), coord);
    }

    #[test]
    fn test_chebyshev() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.chebyshev(&ChunkCoord::new(2, -1)), 2);
        assert_eq!(a.chebyshev(&ChunkCoord::new(-1, -1)), 1);
        assert_eq!(a.chebyshev(&a), 0);
    }
}
