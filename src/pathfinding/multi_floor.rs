//! Floor-crossing path search through stair links

use glam::Vec2;

use crate::core::types::FloorPoint;
use crate::pathfinding::astar::{path_length, Pathfinder};
use crate::spatial::geometry::Rect;
use crate::world::obstacles::Obstacle;

impl Pathfinder {
    /// Find a path that may change floors.
    ///
    /// `floor_obstacles(f)` yields the obstacles of floor `f`. Stairs on the
    /// current floor whose link points one floor closer to the goal are
    /// tried in turn; the cheapest combination of (walk to stair) +
    /// (remaining route from the linked stair) + transition penalty wins.
    /// Returns None when no stairs lead in the needed direction or none of
    /// them is reachable.
    pub fn find_path_multi_floor<'a, F, I>(
        &self,
        start: FloorPoint,
        end: FloorPoint,
        floor_obstacles: &F,
        search_bounds: &Rect,
        grid_size: f32,
    ) -> Option<Vec<FloorPoint>>
    where
        F: Fn(usize) -> I,
        I: IntoIterator<Item = &'a Obstacle>,
    {
        self.route(start, end, floor_obstacles, search_bounds, grid_size)
            .map(|(_, path)| path)
    }

    fn route<'a, F, I>(
        &self,
        start: FloorPoint,
        end: FloorPoint,
        floor_obstacles: &F,
        search_bounds: &Rect,
        grid_size: f32,
    ) -> Option<(f32, Vec<FloorPoint>)>
    where
        F: Fn(usize) -> I,
        I: IntoIterator<Item = &'a Obstacle>,
    {
        if start.floor == end.floor {
            let path = self.find_path(
                start.position,
                end.position,
                floor_obstacles(start.floor),
                search_bounds,
                grid_size,
            )?;
            return Some((path_length(&path), on_floor(path, start.floor)));
        }

        let next_floor = if end.floor > start.floor {
            start.floor + 1
        } else {
            start.floor - 1
        };

        let candidates: Vec<(Vec2, Vec2)> = floor_obstacles(start.floor)
            .into_iter()
            .filter_map(|o| {
                o.stair_link()
                    .filter(|link| link.target_floor == next_floor)
                    .map(|link| (o.rect.center, link.target_position))
            })
            .collect();

        if candidates.is_empty() {
            tracing::trace!(
                from = start.floor,
                to = next_floor,
                "no stairs lead in the needed direction"
            );
            return None;
        }

        let mut best: Option<(f32, Vec<FloorPoint>)> = None;
        for (stair_pos, arrival) in candidates {
            let Some(to_stair) = self.find_path(
                start.position,
                stair_pos,
                floor_obstacles(start.floor),
                search_bounds,
                grid_size,
            ) else {
                continue;
            };
            let Some((rest_cost, rest)) = self.route(
                FloorPoint::new(arrival, next_floor),
                end,
                floor_obstacles,
                search_bounds,
                grid_size,
            ) else {
                continue;
            };

            let cost = path_length(&to_stair) + rest_cost + self.settings().stair_transition_penalty;
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                let mut path = on_floor(to_stair, start.floor);
                path.extend(rest);
                best = Some((cost, path));
            }
        }

        best
    }
}

fn on_floor(path: Vec<Vec2>, floor: usize) -> Vec<FloorPoint> {
    path.into_iter().map(|p| FloorPoint::new(p, floor)).collect()
}
