//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;
use glam::Vec2;

/// Sparse hash grid for O(1) neighbor queries
///
/// Stores a copy of each entry's position so queries never have to reach
/// back into the owning collection.
#[derive(Debug, Clone)]
pub struct SparseHashGrid<K: Copy + Eq> {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(K, Vec2)>>,
}

impl<K: Copy + Eq> SparseHashGrid<K> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, key: K, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((key, pos));
    }

    pub fn remove(&mut self, key: K, pos: Vec2) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|(k, _)| *k != key);
        }
    }

    /// Query entries within radius of a point
    pub fn query_radius(&self, center: Vec2, radius: f32) -> impl Iterator<Item = (K, Vec2)> + '_ {
        let (cx, cy) = self.cell_coord(center);
        let reach = (radius / self.cell_size).ceil().max(1.0) as i32;
        let radius_sq = radius * radius;

        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(move |(_, pos)| pos.distance_squared(center) <= radius_sq)
            })
        })
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (K, Vec2)>) {
        self.clear();
        for (key, pos) in entries {
            self.insert(key, pos);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }
}
