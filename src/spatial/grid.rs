//! Generic grid for spatial data

use glam::Vec2;

use crate::spatial::geometry::Rect;

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Signed lookup; negative or out-of-range coordinates return None
    #[inline]
    pub fn get_signed(&self, x: i64, y: i64) -> Option<&T> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx] = value;
        }
    }

    /// Cell containing a world position, or None when it lies outside the grid
    #[inline]
    pub fn cell_at(&self, pos: Vec2) -> Option<(usize, usize)> {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor();
        let y = ((pos.y - self.origin.y) / self.cell_size).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            self.origin.y + (y as f32 + 0.5) * self.cell_size,
        )
    }

    /// World-space rectangle covered by a cell
    pub fn cell_rect(&self, x: usize, y: usize) -> Rect {
        Rect::new(self.cell_center(x, y), Vec2::splat(self.cell_size))
    }

    /// Inclusive cell range overlapped (strictly) by a world rectangle
    ///
    /// Returns None when the rectangle lies entirely outside the grid.
    pub fn cells_overlapping(&self, rect: &Rect) -> Option<((usize, usize), (usize, usize))> {
        let min = (rect.min() - self.origin) / self.cell_size;
        let max = (rect.max() - self.origin) / self.cell_size;
        // A rect ending exactly on a cell boundary does not enter the next cell
        let x0 = min.x.floor() as i64;
        let y0 = min.y.floor() as i64;
        let x1 = max.x.ceil() as i64 - 1;
        let y1 = max.y.ceil() as i64 - 1;
        if x1 < 0 || y1 < 0 || x0 >= self.width as i64 || y0 >= self.height as i64 || x1 < x0 || y1 < y0 {
            return None;
        }
        Some((
            (x0.max(0) as usize, y0.max(0) as usize),
            (x1.min(self.width as i64 - 1) as usize, y1.min(self.height as i64 - 1) as usize),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at_rejects_outside() {
        let grid: Grid<bool> = Grid::new(4, 4, 10.0, Vec2::new(100.0, 100.0));
        assert_eq!(grid.cell_at(Vec2::new(115.0, 125.0)), Some((1, 2)));
        assert_eq!(grid.cell_at(Vec2::new(139.9, 100.0)), Some((3, 0)));
        assert_eq!(grid.cell_at(Vec2::new(140.0, 100.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(99.0, 120.0)), None);
    }

    #[test]
    fn test_cell_center_and_rect() {
        let grid: Grid<u8> = Grid::new(4, 4, 10.0, Vec2::ZERO);
        assert_eq!(grid.cell_center(1, 2), Vec2::new(15.0, 25.0));
        assert!(grid.cell_rect(1, 2).contains(Vec2::new(11.0, 29.0)));
    }

    #[test]
    fn test_cells_overlapping_excludes_touching_edge() {
        let grid: Grid<bool> = Grid::new(10, 10, 10.0, Vec2::ZERO);
        let rect = Rect::from_min_max(Vec2::new(10.0, 10.0), Vec2::new(30.0, 20.0));
        assert_eq!(grid.cells_overlapping(&rect), Some(((1, 1), (2, 1))));
    }

    #[test]
    fn test_cells_overlapping_outside() {
        let grid: Grid<bool> = Grid::new(10, 10, 10.0, Vec2::ZERO);
        let rect = Rect::from_min_max(Vec2::new(-30.0, -30.0), Vec2::new(-10.0, -10.0));
        assert!(grid.cells_overlapping(&rect).is_none());
    }

    #[test]
    fn test_set_get_and_index() {
        let mut grid: Grid<u32> = Grid::new(3, 2, 1.0, Vec2::ZERO);
        grid.set(2, 1, 7);
        assert_eq!(grid.get(2, 1), Some(&7));
        assert_eq!(grid.get(3, 1), None);
        assert_eq!(grid.get_signed(-1, 0), None);
        let idx = grid.index(2, 1);
        assert_eq!(grid.coords(idx), (2, 1));
        assert_eq!(grid.len(), 6);
    }
}
