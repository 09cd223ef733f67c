//! Pathfinding integration tests
//!
//! Property tests run over a 10x10 cell area so the rasterised grid is
//! exactly the search bounds, which lets the tests recompute reachability
//! independently.

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use proptest::prelude::*;

use skulk::core::config::PathfindingConfig;
use skulk::core::types::FloorPoint;
use skulk::pathfinding::{path_length, Pathfinder};
use skulk::spatial::Rect;
use skulk::world::obstacles::{Obstacle, ObstacleSet, StairLink};

const CELL: f32 = 32.0;
const CELLS: i32 = 10;

fn bounds() -> Rect {
    Rect::from_min_max(Vec2::ZERO, Vec2::splat(CELL * CELLS as f32))
}

fn pathfinder() -> Pathfinder {
    Pathfinder::new(PathfindingConfig::default())
}

/// A wall covering exactly the cells `x..x+w` by `y..y+h`
fn cell_wall(x: i32, y: i32, w: i32, h: i32) -> Obstacle {
    let min = Vec2::new(x as f32, y as f32) * CELL + Vec2::splat(1.0);
    let max = Vec2::new((x + w) as f32, (y + h) as f32) * CELL - Vec2::splat(1.0);
    Obstacle::wall(Rect::from_min_max(min, max))
}

fn blocked_cells(walls: &[(i32, i32, i32, i32)]) -> HashSet<(i32, i32)> {
    walls
        .iter()
        .flat_map(|&(x, y, w, h)| (x..x + w).flat_map(move |cx| (y..y + h).map(move |cy| (cx, cy))))
        .filter(|&(x, y)| x < CELLS && y < CELLS)
        .collect()
}

fn free(blocked: &HashSet<(i32, i32)>, cell: (i32, i32)) -> bool {
    (0..CELLS).contains(&cell.0) && (0..CELLS).contains(&cell.1) && !blocked.contains(&cell)
}

/// 8-connected flood fill with the same corner rule as the search
fn reachable(blocked: &HashSet<(i32, i32)>, from: (i32, i32), to: (i32, i32)) -> bool {
    let mut seen = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some((x, y)) = queue.pop_front() {
        if (x, y) == to {
            return true;
        }
        for dx in -1..=1 {
            for dy in -1..=1 {
                let next = (x + dx, y + dy);
                if (dx, dy) == (0, 0) || !free(blocked, next) {
                    continue;
                }
                if dx != 0 && dy != 0 && (!free(blocked, (x + dx, y)) || !free(blocked, (x, y + dy))) {
                    continue;
                }
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    false
}

fn cell_of(p: Vec2) -> (i32, i32) {
    ((p.x / CELL).floor() as i32, (p.y / CELL).floor() as i32)
}

fn center_of(cell: (i32, i32)) -> Vec2 {
    (Vec2::new(cell.0 as f32, cell.1 as f32) + 0.5) * CELL
}

fn walls_strategy() -> impl Strategy<Value = Vec<(i32, i32, i32, i32)>> {
    prop::collection::vec((0..CELLS, 0..CELLS, 1..4i32, 1..4i32), 0..8)
}

fn point_strategy() -> impl Strategy<Value = Vec2> {
    (0..CELLS, 0..CELLS, 2.0f32..30.0, 2.0f32..30.0)
        .prop_map(|(cx, cy, ox, oy)| Vec2::new(cx as f32 * CELL + ox, cy as f32 * CELL + oy))
}

proptest! {
    #[test]
    fn test_paths_are_valid_and_found_when_reachable(
        walls in walls_strategy(),
        start in point_strategy(),
        end in point_strategy(),
    ) {
        let blocked = blocked_cells(&walls);
        let (start_cell, end_cell) = (cell_of(start), cell_of(end));
        prop_assume!(free(&blocked, start_cell) && free(&blocked, end_cell));

        let obstacles: Vec<Obstacle> = walls.iter().map(|&(x, y, w, h)| cell_wall(x, y, w, h)).collect();
        let path = pathfinder().find_path(start, end, obstacles.iter(), &bounds(), CELL);

        prop_assert_eq!(path.is_some(), reachable(&blocked, start_cell, end_cell));
        if let Some(path) = path {
            prop_assert_eq!(path[0], center_of(start_cell));
            prop_assert_eq!(*path.last().unwrap(), center_of(end_cell));
            for pair in path.windows(2) {
                let (a, b) = (cell_of(pair[0]), cell_of(pair[1]));
                let (dx, dy) = (b.0 - a.0, b.1 - a.1);
                prop_assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
                prop_assert!(free(&blocked, b));
            }
        }
    }

    #[test]
    fn test_paths_never_cut_corners(
        walls in walls_strategy(),
        start in point_strategy(),
        end in point_strategy(),
    ) {
        let blocked = blocked_cells(&walls);
        prop_assume!(free(&blocked, cell_of(start)) && free(&blocked, cell_of(end)));

        let obstacles: Vec<Obstacle> = walls.iter().map(|&(x, y, w, h)| cell_wall(x, y, w, h)).collect();
        if let Some(path) = pathfinder().find_path(start, end, obstacles.iter(), &bounds(), CELL) {
            for pair in path.windows(2) {
                let (a, b) = (cell_of(pair[0]), cell_of(pair[1]));
                let (dx, dy) = (b.0 - a.0, b.1 - a.1);
                if dx != 0 && dy != 0 {
                    prop_assert!(free(&blocked, (a.0 + dx, a.1)));
                    prop_assert!(free(&blocked, (a.0, a.1 + dy)));
                }
            }
        }
    }
}

#[test]
fn test_full_width_wall_blocks_route() {
    let wide = Rect::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(640.0, 640.0));
    let wall = Obstacle::wall(Rect::from_min_max(Vec2::new(-100.0, 300.0), Vec2::new(740.0, 340.0)));
    let path = pathfinder().find_path(Vec2::new(320.0, 80.0), Vec2::new(320.0, 560.0), [&wall], &wide, CELL);
    assert!(path.is_none());
}

#[test]
fn test_closed_door_blocks_until_opened() {
    let wide = Rect::from_min_max(Vec2::ZERO, Vec2::splat(640.0));
    let mut set = ObstacleSet::new();
    set.add(Obstacle::wall(Rect::from_min_max(Vec2::new(-100.0, 300.0), Vec2::new(256.0, 340.0))));
    let door = set.add(Obstacle::door(Rect::from_min_max(Vec2::new(256.0, 300.0), Vec2::new(384.0, 340.0))));
    set.add(Obstacle::wall(Rect::from_min_max(Vec2::new(384.0, 300.0), Vec2::new(740.0, 340.0))));

    let (start, end) = (Vec2::new(320.0, 80.0), Vec2::new(320.0, 560.0));
    assert!(pathfinder().find_path(start, end, set.iter(), &wide, CELL).is_none());

    set.set_door_open(door, true);
    let path = pathfinder().find_path(start, end, set.iter(), &wide, CELL).unwrap();
    assert!(path.iter().any(|p| (300.0..=340.0).contains(&p.y)));
}

#[test]
fn test_stair_route_concatenates_both_floors() {
    let a = Vec2::new(208.0, 208.0);
    let b = Vec2::new(432.0, 144.0);
    let mut ground = ObstacleSet::new();
    let mut upper = ObstacleSet::new();
    ground.add(Obstacle::stairs(Rect::new(a, Vec2::splat(40.0)), StairLink { target_floor: 1, target_position: b }));
    upper.add(Obstacle::stairs(Rect::new(b, Vec2::splat(40.0)), StairLink { target_floor: 0, target_position: a }));
    let floors = [ground, upper];
    let lookup = |f: usize| floors[f].iter();

    let wide = Rect::from_min_max(Vec2::ZERO, Vec2::splat(640.0));
    let start = Vec2::new(144.0, 176.0);
    let end = Vec2::new(496.0, 112.0);
    let pf = pathfinder();

    let path = pf
        .find_path_multi_floor(FloorPoint::new(start, 0), FloorPoint::new(end, 1), &lookup, &wide, CELL)
        .unwrap();
    let to_stair = pf.find_path(start, a, floors[0].iter(), &wide, CELL).unwrap();
    let from_stair = pf.find_path(b, end, floors[1].iter(), &wide, CELL).unwrap();

    assert_eq!(path.len(), to_stair.len() + from_stair.len());
    let switch = path.iter().position(|p| p.floor == 1).unwrap();
    assert_eq!(switch, to_stair.len());
    assert!(path[switch - 1].position.distance(a) < CELL);
    assert!(path[switch].position.distance(b) < CELL);
    assert_eq!(path.last().map(|p| p.floor), Some(1));
}

#[test]
fn test_floor_change_without_stairs_fails() {
    let floors = [ObstacleSet::new(), ObstacleSet::new()];
    let lookup = |f: usize| floors[f].iter();
    let wide = Rect::from_min_max(Vec2::ZERO, Vec2::splat(640.0));
    let path = pathfinder().find_path_multi_floor(
        FloorPoint::new(Vec2::new(48.0, 48.0), 0),
        FloorPoint::new(Vec2::new(300.0, 300.0), 1),
        &lookup,
        &wide,
        CELL,
    );
    assert!(path.is_none());
}

#[test]
fn test_octile_never_longer_than_manhattan() {
    let wide = Rect::from_min_max(Vec2::ZERO, Vec2::splat(640.0));
    let walls = [
        cell_wall(4, 0, 1, 12),
        cell_wall(9, 6, 1, 14),
        cell_wall(13, 2, 6, 1),
    ];
    let (start, end) = (Vec2::new(48.0, 48.0), Vec2::new(600.0, 560.0));

    let manhattan = pathfinder().find_path(start, end, walls.iter(), &wide, CELL).unwrap();
    let octile = Pathfinder::new(PathfindingConfig {
        heuristic: skulk::core::config::Heuristic::Octile,
        ..PathfindingConfig::default()
    })
    .find_path(start, end, walls.iter(), &wide, CELL)
    .unwrap();

    assert!(path_length(&octile) <= path_length(&manhattan) + 1e-3);
}

#[test]
fn test_endpoint_beyond_capped_grid_finds_no_path() {
    // 300 cells apart in open ground: the grid stops at 256 cells per axis
    let open = Rect::from_min_max(Vec2::splat(-100_000.0), Vec2::splat(100_000.0));
    let start = Vec2::new(16.0, 16.0);
    let end = Vec2::new(16.0 + 300.0 * CELL, 16.0);
    assert!(pathfinder().find_path(start, end, std::iter::empty::<&Obstacle>(), &open, CELL).is_none());

    let near = Vec2::new(16.0 + 200.0 * CELL, 16.0);
    let path = pathfinder().find_path(start, near, std::iter::empty::<&Obstacle>(), &open, CELL).unwrap();
    assert_eq!(cell_of(*path.last().unwrap()), cell_of(near));
}
