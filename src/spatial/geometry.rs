//! 2D geometry primitives: center-anchored rectangles, segment tests and
//! ray sweeps.
//!
//! Vectors are `glam::Vec2` and are treated as immutable values. Use
//! `normalize_or_zero` (never `normalize`) so that a zero vector stays zero
//! instead of turning into NaN.

use glam::Vec2;
use serde::{Deserialize, Serialize};

const EPSILON: f32 = 1e-6;

/// Axis-aligned rectangle anchored at its center
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    #[inline]
    pub fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_size()
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_size()
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Inclusive point containment
    pub fn contains(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Strict overlap; rectangles that merely share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    /// Grow (or shrink, with a negative margin) on every side
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect {
            center: self.center,
            size: (self.size + Vec2::splat(margin * 2.0)).max(Vec2::ZERO),
        }
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Clamp a rectangle so it lies inside `bounds`
    pub fn clamped_to(&self, bounds: &Rect) -> Rect {
        let min = self.min().max(bounds.min());
        let max = self.max().min(bounds.max()).max(min);
        Rect::from_min_max(min, max)
    }

    /// Distance from a point to the rectangle (0 inside)
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let clamped = point.clamp(self.min(), self.max());
        clamped.distance(point)
    }

    /// Horizontal overlap length with another rectangle
    pub fn overlap_x(&self, other: &Rect) -> f32 {
        (self.max().x.min(other.max().x) - self.min().x.max(other.min().x)).max(0.0)
    }
}

/// Intersection point of segments `a1-a2` and `b1-b2`, if any
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.perp_dot(s);
    if denom.abs() < EPSILON {
        // Parallel or collinear; collinear overlap is treated as no crossing
        return None;
    }

    let qp = b1 - a1;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r * t)
    } else {
        None
    }
}

/// Sweep a ray `origin + delta * t` (t in [0, 1]) against a rectangle.
///
/// Returns the entry parameter `t`. A ray starting inside the rectangle
/// reports `Some(0.0)`.
pub fn ray_rect_sweep(origin: Vec2, delta: Vec2, rect: &Rect) -> Option<f32> {
    let min = rect.min();
    let max = rect.max();
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..2 {
        let (o, d, lo, hi) = if axis == 0 {
            (origin.x, delta.x, min.x, max.x)
        } else {
            (origin.y, delta.y, min.y, max.y)
        };

        if d.abs() < EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (lo - o) * inv;
        let mut t2 = (hi - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

/// True if the segment `from-to` touches the rectangle
pub fn segment_hits_rect(from: Vec2, to: Vec2, rect: &Rect) -> bool {
    ray_rect_sweep(from, to - from, rect).is_some()
}

/// True when no rectangle blocks the straight line between two points
pub fn line_of_sight<'a>(from: Vec2, to: Vec2, blockers: impl IntoIterator<Item = &'a Rect>) -> bool {
    blockers.into_iter().all(|rect| !segment_hits_rect(from, to, rect))
}

/// Angle (radians, 0..=π) between two directions; zero vectors give 0
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Rect {
        Rect::new(Vec2::new(x, y), Vec2::splat(side))
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        let v = Vec2::ZERO.normalize_or_zero();
        assert_eq!(v, Vec2::ZERO);
        assert!(!v.x.is_nan());
    }

    #[test]
    fn test_rect_bounds() {
        let r = square(10.0, 10.0, 4.0);
        assert_eq!(r.min(), Vec2::new(8.0, 8.0));
        assert_eq!(r.max(), Vec2::new(12.0, 12.0));
        assert!(r.contains(Vec2::new(12.0, 8.0)));
        assert!(!r.contains(Vec2::new(12.1, 8.0)));
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(2.0, 0.0, 2.0);
        let c = square(1.5, 0.0, 2.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_clamped_to() {
        let bounds = Rect::from_min_max(Vec2::ZERO, Vec2::splat(100.0));
        let r = Rect::from_min_max(Vec2::new(-50.0, 20.0), Vec2::new(60.0, 150.0));
        let c = r.clamped_to(&bounds);
        assert_eq!(c.min(), Vec2::new(0.0, 20.0));
        assert_eq!(c.max(), Vec2::new(60.0, 100.0));
    }

    #[test]
    fn test_segment_intersection_cross() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        let p = hit.unwrap();
        assert!((p - Vec2::new(5.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_segment_intersection_miss_and_parallel() {
        assert!(segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 10.0)
        )
        .is_none());
        assert!(segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0)
        )
        .is_none());
    }

    #[test]
    fn test_ray_sweep_entry_time() {
        let rect = square(10.0, 0.0, 2.0);
        let t = ray_rect_sweep(Vec2::ZERO, Vec2::new(20.0, 0.0), &rect).unwrap();
        assert!((t - 0.45).abs() < 1e-5);
    }

    #[test]
    fn test_ray_sweep_short_ray_misses() {
        let rect = square(10.0, 0.0, 2.0);
        assert!(ray_rect_sweep(Vec2::ZERO, Vec2::new(5.0, 0.0), &rect).is_none());
    }

    #[test]
    fn test_ray_sweep_starting_inside() {
        let rect = square(0.0, 0.0, 4.0);
        assert_eq!(ray_rect_sweep(Vec2::ZERO, Vec2::new(0.0, 10.0), &rect), Some(0.0));
    }

    #[test]
    fn test_ray_sweep_axis_parallel_outside() {
        let rect = square(10.0, 10.0, 2.0);
        assert!(ray_rect_sweep(Vec2::ZERO, Vec2::new(20.0, 0.0), &rect).is_none());
    }

    #[test]
    fn test_line_of_sight() {
        let wall = square(5.0, 0.0, 1.0);
        let walls = [wall];
        assert!(!line_of_sight(Vec2::ZERO, Vec2::new(10.0, 0.0), walls.iter()));
        assert!(line_of_sight(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0), walls.iter()));
    }

    #[test]
    fn test_angle_between() {
        let a = angle_between(Vec2::X, Vec2::Y);
        assert!((a - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(angle_between(Vec2::ZERO, Vec2::Y), 0.0);
    }
}
