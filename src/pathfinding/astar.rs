//! A* pathfinding over a locally rasterised occupancy grid
//!
//! Each request builds a small grid around the start and end points
//! (clamped to the caller's search bounds), marks every cell overlapped by a
//! movement-blocking obstacle, and searches it with 8-directional A*.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use glam::Vec2;
use ordered_float::OrderedFloat;

use crate::core::config::{Heuristic, PathfindingConfig};
use crate::spatial::geometry::Rect;
use crate::spatial::grid::Grid;
use crate::world::obstacles::Obstacle;

const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// (dx, dy, cost) for the eight neighbours
const NEIGHBORS: [(i64, i64, f32); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, DIAGONAL_COST),
    (1, -1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

/// Node in the A* open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    index: usize,
    f_cost: OrderedFloat<f32>, // g_cost + heuristic
    h_cost: OrderedFloat<f32>,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; equal f prefers the lower h
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rasterised walkability grid. `true` marks a blocked cell.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Grid<bool>,
}

impl OccupancyGrid {
    /// Rasterise obstacles over `area`, aligned to multiples of `grid_size`
    pub fn rasterize<'a>(
        area: &Rect,
        grid_size: f32,
        max_cells_per_axis: usize,
        obstacles: impl IntoIterator<Item = &'a Obstacle>,
    ) -> Self {
        let origin = (area.min() / grid_size).floor() * grid_size;
        let span = area.max() - origin;
        let width = ((span.x / grid_size).ceil() as usize).clamp(1, max_cells_per_axis);
        let height = ((span.y / grid_size).ceil() as usize).clamp(1, max_cells_per_axis);

        let mut cells = Grid::new(width, height, grid_size, origin);
        for obstacle in obstacles.into_iter().filter(|o| o.blocks_movement()) {
            let Some(((x0, y0), (x1, y1))) = cells.cells_overlapping(&obstacle.rect) else {
                continue;
            };
            for y in y0..=y1 {
                for x in x0..=x1 {
                    cells.set(x, y, true);
                }
            }
        }

        Self { cells }
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    pub fn is_walkable(&self, x: i64, y: i64) -> bool {
        matches!(self.cells.get_signed(x, y), Some(false))
    }

    /// Cell under `pos`; None when the capped grid does not reach it
    pub fn cell_of(&self, pos: Vec2) -> Option<(usize, usize)> {
        self.cells.cell_at(pos)
    }

    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        self.cells.cell_center(x, y)
    }

    /// Breadth-first search for the closest walkable cell within `max_depth`
    /// steps (8-connected)
    pub fn nearest_walkable(&self, from: (usize, usize), max_depth: u32) -> Option<(usize, usize)> {
        if self.is_walkable(from.0 as i64, from.1 as i64) {
            return Some(from);
        }

        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        visited[self.cells.index(from.0, from.1)] = true;
        queue.push_back((from, 0u32));

        while let Some(((x, y), depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for (dx, dy, _) in NEIGHBORS {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if self.cells.get_signed(nx, ny).is_none() {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let idx = self.cells.index(nx, ny);
                if visited[idx] {
                    continue;
                }
                visited[idx] = true;
                if self.is_walkable(nx as i64, ny as i64) {
                    return Some((nx, ny));
                }
                queue.push_back(((nx, ny), depth + 1));
            }
        }

        None
    }

    /// Whether a move from (x, y) by (dx, dy) is allowed. A diagonal needs
    /// both orthogonal neighbours free; one blocked side already forbids it.
    fn can_step(&self, x: i64, y: i64, dx: i64, dy: i64) -> bool {
        if !self.is_walkable(x + dx, y + dy) {
            return false;
        }
        if dx != 0 && dy != 0 {
            return self.is_walkable(x + dx, y) && self.is_walkable(x, y + dy);
        }
        true
    }

    /// Classic A* between two walkable cells. Returns cells from start to goal.
    pub fn search(
        &self,
        start: (usize, usize),
        goal: (usize, usize),
        heuristic: Heuristic,
    ) -> Option<Vec<(usize, usize)>> {
        if start == goal {
            return Some(vec![start]);
        }

        let cell_count = self.cells.len();
        let mut open_set = BinaryHeap::new();
        let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
        let mut g_scores = vec![f32::INFINITY; cell_count];
        let mut closed = vec![false; cell_count];

        let start_idx = self.cells.index(start.0, start.1);
        let goal_idx = self.cells.index(goal.0, goal.1);
        let h = estimate(start, goal, heuristic);
        g_scores[start_idx] = 0.0;
        open_set.push(PathNode {
            index: start_idx,
            f_cost: OrderedFloat(h),
            h_cost: OrderedFloat(h),
        });

        while let Some(current) = open_set.pop() {
            if current.index == goal_idx {
                return Some(self.reconstruct(&came_from, goal_idx));
            }
            if closed[current.index] {
                continue;
            }
            closed[current.index] = true;

            let (cx, cy) = self.cells.coords(current.index);
            let current_g = g_scores[current.index];

            for (dx, dy, step_cost) in NEIGHBORS {
                if !self.can_step(cx as i64, cy as i64, dx, dy) {
                    continue;
                }
                let nx = (cx as i64 + dx) as usize;
                let ny = (cy as i64 + dy) as usize;
                let n_idx = self.cells.index(nx, ny);
                if closed[n_idx] {
                    continue;
                }

                let tentative_g = current_g + step_cost;
                if tentative_g < g_scores[n_idx] {
                    came_from[n_idx] = Some(current.index);
                    g_scores[n_idx] = tentative_g;
                    let h = estimate((nx, ny), goal, heuristic);
                    open_set.push(PathNode {
                        index: n_idx,
                        f_cost: OrderedFloat(tentative_g + h),
                        h_cost: OrderedFloat(h),
                    });
                }
            }
        }

        None // Open set exhausted
    }

    /// Walk back from the goal, then reverse into start-to-goal order
    fn reconstruct(&self, came_from: &[Option<usize>], goal_idx: usize) -> Vec<(usize, usize)> {
        let mut path = vec![self.cells.coords(goal_idx)];
        let mut current = goal_idx;
        while let Some(prev) = came_from[current] {
            path.push(self.cells.coords(prev));
            current = prev;
        }
        path.reverse();
        path
    }
}

fn estimate(from: (usize, usize), to: (usize, usize), heuristic: Heuristic) -> f32 {
    let dx = (from.0 as f32 - to.0 as f32).abs();
    let dy = (from.1 as f32 - to.1 as f32).abs();
    match heuristic {
        Heuristic::Manhattan => dx + dy,
        Heuristic::Octile => dx.max(dy) + (DIAGONAL_COST - 1.0) * dx.min(dy),
    }
}

/// Grid pathfinder configured from `PathfindingConfig`
#[derive(Debug, Clone)]
pub struct Pathfinder {
    settings: PathfindingConfig,
}

impl Pathfinder {
    pub fn new(settings: PathfindingConfig) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PathfindingConfig {
        &self.settings
    }

    /// Find a path between two world points.
    ///
    /// Returns grid-cell centers from the start cell to the end cell, or
    /// None when an endpoint falls outside the (capped) search grid, cannot be
    /// relocated onto walkable ground, or no route exists inside `search_bounds`.
    pub fn find_path<'a>(
        &self,
        start: Vec2,
        end: Vec2,
        obstacles: impl IntoIterator<Item = &'a Obstacle>,
        search_bounds: &Rect,
        grid_size: f32,
    ) -> Option<Vec<Vec2>> {
        let margin = self.settings.margin_cells as f32 * grid_size;
        let area = Rect::from_min_max(start.min(end), start.max(end))
            .expanded(margin)
            .clamped_to(search_bounds);

        let grid = OccupancyGrid::rasterize(&area, grid_size, self.settings.max_cells_per_axis, obstacles);

        let (Some(start_cell), Some(end_cell)) = (grid.cell_of(start), grid.cell_of(end)) else {
            tracing::trace!(?start, ?end, width = grid.width(), height = grid.height(), "endpoint outside capped search grid");
            return None;
        };

        let depth = self.settings.unwalkable_search_depth;
        let Some(start_cell) = grid.nearest_walkable(start_cell, depth) else {
            tracing::trace!(?start, "path start has no walkable cell nearby");
            return None;
        };
        let Some(goal_cell) = grid.nearest_walkable(end_cell, depth) else {
            tracing::trace!(?end, "path end has no walkable cell nearby");
            return None;
        };

        let cells = grid.search(start_cell, goal_cell, self.settings.heuristic);
        if cells.is_none() {
            tracing::trace!(?start, ?end, "no route in search area");
        }
        cells.map(|cells| {
            cells
                .into_iter()
                .map(|(x, y)| grid.cell_center(x, y))
                .collect()
        })
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(crate::core::config::config().pathfinding.clone())
    }
}

/// Find a path with the globally configured pathfinding settings
pub fn find_path<'a>(
    start: Vec2,
    end: Vec2,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
    search_bounds: &Rect,
    grid_size: f32,
) -> Option<Vec<Vec2>> {
    Pathfinder::default().find_path(start, end, obstacles, search_bounds, grid_size)
}

/// Total length of a polyline
pub fn path_length(path: &[Vec2]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::obstacles::Obstacle;

    const NO_OBSTACLES: [Obstacle; 0] = [];

    fn bounds() -> Rect {
        Rect::from_min_max(Vec2::ZERO, Vec2::splat(640.0))
    }

    fn wall(min: Vec2, max: Vec2) -> Obstacle {
        Obstacle::wall(Rect::from_min_max(min, max))
    }

    #[test]
    fn test_pathfind_straight_line() {
        let path = find_path(Vec2::new(16.0, 16.0), Vec2::new(208.0, 16.0), NO_OBSTACLES.iter(), &bounds(), 32.0).unwrap();
        assert_eq!(path.first(), Some(&Vec2::new(16.0, 16.0)));
        assert_eq!(path.last(), Some(&Vec2::new(208.0, 16.0)));
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn test_pathfind_same_cell() {
        let path = find_path(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0), NO_OBSTACLES.iter(), &bounds(), 32.0).unwrap();
        assert_eq!(path, vec![Vec2::new(16.0, 16.0)]);
    }

    #[test]
    fn test_pathfind_around_obstacle() {
        // Vertical wall from y=0 to y=256 at x=128..160 with room to pass below
        let obstacles = [wall(Vec2::new(128.0, 0.0), Vec2::new(160.0, 256.0))];
        let path = find_path(
            Vec2::new(48.0, 48.0),
            Vec2::new(240.0, 48.0),
            obstacles.iter(),
            &bounds(),
            32.0,
        )
        .unwrap();

        for p in &path {
            assert!(!obstacles[0].rect.contains(*p), "waypoint {p:?} inside wall");
        }
        assert!(path.iter().any(|p| p.y > 256.0));
    }

    #[test]
    fn test_pathfind_blocked_by_full_wall() {
        let obstacles = [wall(Vec2::new(300.0, 0.0), Vec2::new(340.0, 640.0))];
        let path = find_path(
            Vec2::new(100.0, 300.0),
            Vec2::new(500.0, 300.0),
            obstacles.iter(),
            &bounds(),
            32.0,
        );
        assert!(path.is_none());
    }

    #[test]
    fn test_open_door_is_passable() {
        let mut door = Obstacle::door(Rect::from_min_max(Vec2::new(300.0, 0.0), Vec2::new(340.0, 640.0)));
        assert!(find_path(Vec2::new(100.0, 300.0), Vec2::new(500.0, 300.0), [door.clone()].iter(), &bounds(), 32.0).is_none());

        door.kind = crate::world::obstacles::ObstacleKind::Door { open: true };
        assert!(find_path(Vec2::new(100.0, 300.0), Vec2::new(500.0, 300.0), [door].iter(), &bounds(), 32.0).is_some());
    }

    #[test]
    fn test_unwalkable_goal_relocated() {
        // Goal sits inside a small block; nearest walkable neighbour is used
        let obstacles = [wall(Vec2::new(320.0, 320.0), Vec2::new(352.0, 352.0))];
        let path = find_path(
            Vec2::new(48.0, 48.0),
            Vec2::new(336.0, 336.0),
            obstacles.iter(),
            &bounds(),
            32.0,
        )
        .unwrap();
        let last = *path.last().unwrap();
        assert!(!obstacles[0].rect.contains(last));
        assert!(last.distance(Vec2::new(336.0, 336.0)) <= 32.0 * DIAGONAL_COST + 0.01);
    }

    #[test]
    fn test_goal_buried_too_deep_fails() {
        let obstacles = [wall(Vec2::new(200.0, 200.0), Vec2::new(600.0, 600.0))];
        let path = find_path(
            Vec2::new(48.0, 48.0),
            Vec2::new(400.0, 400.0),
            obstacles.iter(),
            &bounds(),
            32.0,
        );
        assert!(path.is_none());
    }

    #[test]
    fn test_no_corner_cutting() {
        let grid_size = 32.0;
        // Two blocks touching diagonally at (96, 96)
        let obstacles = [
            wall(Vec2::new(64.0, 64.0), Vec2::new(96.0, 96.0)),
            wall(Vec2::new(96.0, 96.0), Vec2::new(128.0, 128.0)),
        ];
        let area = bounds();
        let grid = OccupancyGrid::rasterize(&area, grid_size, 256, obstacles.iter());
        // (2,3) -> (3,2) would slip between the two blocks
        assert!(!grid.can_step(2, 3, 1, -1));
        assert!(grid.can_step(0, 0, 1, 1));
    }

    #[test]
    fn test_node_ordering_prefers_low_f_then_low_h() {
        let mut heap = BinaryHeap::new();
        heap.push(PathNode { index: 0, f_cost: OrderedFloat(5.0), h_cost: OrderedFloat(3.0) });
        heap.push(PathNode { index: 1, f_cost: OrderedFloat(5.0), h_cost: OrderedFloat(1.0) });
        heap.push(PathNode { index: 2, f_cost: OrderedFloat(4.0), h_cost: OrderedFloat(4.0) });
        assert_eq!(heap.pop().unwrap().index, 2);
        assert_eq!(heap.pop().unwrap().index, 1);
        assert_eq!(heap.pop().unwrap().index, 0);
    }

    #[test]
    fn test_octile_heuristic_straight_diagonal() {
        assert_eq!(estimate((0, 0), (3, 3), Heuristic::Manhattan), 6.0);
        let octile = estimate((0, 0), (3, 3), Heuristic::Octile);
        assert!((octile - 3.0 * DIAGONAL_COST).abs() < 1e-5);
    }

    #[test]
    fn test_path_length() {
        let path = [Vec2::ZERO, Vec2::new(3.0, 4.0), Vec2::new(3.0, 10.0)];
        assert_eq!(path_length(&path), 11.0);
        assert_eq!(path_length(&path[..1]), 0.0);
    }
}
