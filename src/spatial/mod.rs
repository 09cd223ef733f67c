//! Spatial primitives shared by pathfinding, perception and collision

pub mod geometry;
pub mod grid;
pub mod sparse_hash;

pub use geometry::{line_of_sight, ray_rect_sweep, segment_intersection, Rect};
pub use grid::Grid;
pub use sparse_hash::SparseHashGrid;

/// Draw-agnostic surface for depth-sorted rendering.
///
/// A renderer sorts by `sort_y` and draws whatever it likes inside
/// `rect_data`; the simulation never touches a drawing API.
pub trait SpatialQuery {
    fn rect_data(&self) -> Rect;

    /// Bottom edge of the footprint
    fn sort_y(&self) -> f32 {
        self.rect_data().max().y
    }
}
