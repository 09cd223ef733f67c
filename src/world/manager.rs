//! Chunk streaming around the player
//!
//! The manager exclusively owns every loaded chunk. Each call to
//! `update_active_chunks` makes the square of chunks around the player
//! active (generating any that are new) and evicts chunks that have been
//! outside that square for longer than the idle threshold. Evicted content
//! is dropped; coming back regenerates it from the seed.

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use glam::Vec2;

use crate::core::config::SimulationConfig;
use crate::core::types::{BuildingId, ChunkCoord, SettlementId};
use crate::spatial::geometry::Rect;
use crate::world::chunk::{Chunk, Tree};
use crate::world::obstacles::Obstacle;
use crate::world::settlement::Settlement;

pub struct WorldManager {
    seed: u64,
    config: Arc<SimulationConfig>,
    chunks: AHashMap<ChunkCoord, Chunk>,
    active: AHashSet<ChunkCoord>,
    /// Loaded settlements; ordered so update order is reproducible
    settlements: BTreeSet<SettlementId>,
    clock: f64,
}

impl WorldManager {
    pub fn new(seed: u64, config: Arc<SimulationConfig>) -> Self {
        Self {
            seed,
            config,
            chunks: AHashMap::new(),
            active: AHashSet::new(),
            settlements: BTreeSet::new(),
            clock: 0.0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &Arc<SimulationConfig> {
        &self.config
    }

    /// Seconds of world time elapsed
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn advance(&mut self, dt: f32) {
        self.clock += f64::from(dt);
    }

    /// Load the chunks around a world position and evict stale ones
    pub fn update_active_chunks(&mut self, x: f32, y: f32) {
        let size = self.config.world.chunk_size;
        let radius = self.config.world.active_radius;
        let center = ChunkCoord::from_world(Vec2::new(x, y), size);

        self.active.clear();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = ChunkCoord::new(center.x + dx, center.y + dy);
                let chunk = self.chunks.entry(coord).or_insert_with(|| Chunk::new(coord));
                if !chunk.generated {
                    chunk.generate(self.seed, &self.config);
                    tracing::debug!(
                        chunk = ?coord,
                        trees = chunk.trees.len(),
                        decorations = chunk.decorations.len(),
                        settlement = chunk.settlement.is_some(),
                        "chunk generated"
                    );
                    if chunk.settlement.is_some() {
                        self.settlements.insert(coord);
                    }
                }
                chunk.last_access = self.clock;
                self.active.insert(coord);
            }
        }

        self.evict_idle();
    }

    fn evict_idle(&mut self) {
        let idle = f64::from(self.config.world.eviction_idle_secs);
        let clock = self.clock;
        let stale: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(coord, chunk)| !self.active.contains(coord) && clock - chunk.last_access > idle)
            .map(|(coord, _)| *coord)
            .collect();

        for coord in stale {
            if let Some(chunk) = self.chunks.remove(&coord) {
                if chunk.settlement.is_some() {
                    self.settlements.remove(&coord);
                }
                tracing::debug!(chunk = ?coord, idle = clock - chunk.last_access, "chunk evicted");
            }
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_active(&self, coord: ChunkCoord) -> bool {
        self.active.contains(&coord)
    }

    /// Ids of every loaded settlement, in a stable order
    pub fn settlement_ids(&self) -> Vec<SettlementId> {
        self.settlements.iter().copied().collect()
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.chunks.get(&id).and_then(|c| c.settlement.as_ref())
    }

    pub fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.chunks.get_mut(&id).and_then(|c| c.settlement.as_mut())
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> + '_ {
        self.settlements.iter().filter_map(move |id| self.settlement(*id))
    }

    /// Settlement and building whose footprint contains a ground position
    pub fn building_at(&self, point: Vec2) -> Option<(SettlementId, BuildingId)> {
        self.settlements()
            .filter(|s| s.bounds.contains(point))
            .find_map(|s| s.building_at(point).map(|b| (s.id, b)))
    }

    /// Chunks whose bounds overlap `area`
    fn chunks_overlapping(&self, area: Rect) -> impl Iterator<Item = &Chunk> + '_ {
        let size = self.config.world.chunk_size;
        let lo = ChunkCoord::from_world(area.min(), size);
        let hi = ChunkCoord::from_world(area.max(), size);
        (lo.y..=hi.y)
            .flat_map(move |y| (lo.x..=hi.x).map(move |x| ChunkCoord::new(x, y)))
            .filter_map(move |coord| self.chunks.get(&coord))
    }

    /// Loaded trees within `radius` of `point`
    pub fn trees_near(&self, point: Vec2, radius: f32) -> impl Iterator<Item = &Tree> + '_ {
        let area = Rect::new(point, Vec2::splat(radius * 2.0));
        self.chunks_overlapping(area)
            .flat_map(|c| c.trees.iter())
            .filter(move |t| t.position.distance(point) <= radius)
    }

    /// Obstacles overlapping `area` on `floor`.
    ///
    /// The ground floor gathers tree trunks and every loaded building's
    /// ground floor; an upper floor only exists inside `interior`.
    pub fn obstacles_in(&self, area: Rect, floor: usize, interior: Option<(SettlementId, BuildingId)>) -> Vec<&Obstacle> {
        if floor > 0 {
            return interior
                .and_then(|(s, b)| self.settlement(s).and_then(|s| s.building(b)))
                .map(|b| b.obstacles_on(floor).collect())
                .unwrap_or_default();
        }

        let trunks = self
            .chunks_overlapping(area)
            .flat_map(|c| c.trees.iter().map(|t| &t.trunk));
        let walls = self
            .settlements()
            .filter(|s| s.bounds.intersects(&area))
            .flat_map(|s| s.obstacles_on(None, 0));
        trunks.chain(walls).filter(|o| o.rect.intersects(&area)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(seed: u64) -> WorldManager {
        WorldManager::new(seed, Arc::new(SimulationConfig::default()))
    }

    #[test]
    fn test_loads_square_around_player() {
        let mut world = manager(1);
        world.update_active_chunks(100.0, 100.0);
        assert_eq!(world.loaded_chunks(), 9);
        for y in -1..=1 {
            for x in -1..=1 {
                let coord = ChunkCoord::new(x, y);
                assert!(world.is_active(coord));
                assert!(world.chunk(coord).is_some_and(|c| c.generated));
            }
        }
    }

    #[test]
    fn test_idle_chunks_evicted_after_threshold() {
        let mut world = manager(2);
        world.update_active_chunks(0.0, 0.0);
        // Move five chunks east; the old square is no longer active
        let far = 5.0 * world.config().world.chunk_size;
        world.advance(10.0);
        world.update_active_chunks(far, 0.0);
        assert!(world.chunk(ChunkCoord::new(0, 0)).is_some());
        assert_eq!(world.loaded_chunks(), 18);

        world.advance(25.0);
        world.update_active_chunks(far, 0.0);
        assert!(world.chunk(ChunkCoord::new(0, 0)).is_none());
        assert_eq!(world.loaded_chunks(), 9);
        assert!(world.settlements().all(|s| s.id.chebyshev(&ChunkCoord::new(5, 0)) <= 1));
    }

    #[test]
    fn test_regenerated_chunk_matches() {
        let mut world = manager(3);
        world.update_active_chunks(0.0, 0.0);
        let before: Vec<Vec2> = world
            .chunk(ChunkCoord::new(1, 1))
            .map(|c| c.trees.iter().map(|t| t.position).collect())
            .unwrap_or_default();

        let far = 10.0 * world.config().world.chunk_size;
        world.update_active_chunks(far, far);
        world.advance(31.0);
        world.update_active_chunks(far, far);
        assert!(world.chunk(ChunkCoord::new(1, 1)).is_none());

        world.update_active_chunks(0.0, 0.0);
        let after: Vec<Vec2> = world
            .chunk(ChunkCoord::new(1, 1))
            .map(|c| c.trees.iter().map(|t| t.position).collect())
            .unwrap_or_default();
        assert_eq!(before, after);
    }

    #[test]
    fn test_settlement_registry_tracks_loaded_chunks() {
        let mut world = manager(4);
        world.update_active_chunks(0.0, 0.0);
        for id in world.settlement_ids() {
            assert!(world.chunk(id).is_some_and(|c| c.settlement.is_some()));
        }
        let with_settlement = (-1..=1)
            .flat_map(|y| (-1..=1).map(move |x| ChunkCoord::new(x, y)))
            .filter(|c| world.chunk(*c).is_some_and(|c| c.settlement.is_some()))
            .count();
        assert_eq!(world.settlement_ids().len(), with_settlement);
    }

    #[test]
    fn test_trees_near_filters_by_radius() {
        let mut world = manager(5);
        world.update_active_chunks(0.0, 0.0);
        let point = Vec2::new(1500.0, -700.0);
        for tree in world.trees_near(point, 600.0) {
            assert!(tree.position.distance(point) <= 600.0);
        }
    }
}
