//! Grid pathfinding: single-floor A* and stair-linked multi-floor search

pub mod astar;
pub mod multi_floor;

pub use astar::{find_path, path_length, OccupancyGrid, Pathfinder};
