//! Path requests, path following and door-stuck recovery

use glam::Vec2;

use crate::ai::agent::Agent;
use crate::ai::context::{AgentContext, AgentOutcome};
use crate::core::types::FloorPoint;

/// Result of one path-following step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathProgress {
    Moving,
    Arrived,
}

impl Agent {
    /// Compute a path to `target`, replacing the current one.
    ///
    /// Agents inside a building search its floors through the stairs;
    /// everyone else searches the shared ground. The path cooldown restarts
    /// whether or not a path was found.
    pub(crate) fn request_path(&mut self, target: FloorPoint, ctx: &AgentContext<'_>) -> bool {
        self.timers.path_cooldown = self.random_between(ctx.config.path_cooldown_min, ctx.config.path_cooldown_max);
        let start = self.floor_point();
        let building = self.building.and_then(|id| ctx.building(id));

        let path = match building {
            Some(b) if start.floor != target.floor || start.floor > 0 => {
                let lookup = |floor: usize| b.obstacles_on(floor);
                let bounds = ctx.search_bounds(self.building, start.floor.max(target.floor));
                ctx.pathfinder
                    .find_path_multi_floor(start, target, &lookup, &bounds, ctx.grid_size)
            }
            _ if start.floor != target.floor => None,
            _ => ctx
                .pathfinder
                .find_path(start.position, target.position, ctx.obstacles(None, 0), &ctx.bounds, ctx.grid_size)
                .map(|path| path.into_iter().map(FloorPoint::ground).collect()),
        };

        match path {
            Some(path) => {
                self.current_path = Some(path);
                self.current_waypoint_index = 0;
                self.path_target = Some(target);
                true
            }
            None => {
                tracing::trace!(agent = self.id.0, ?target, "path request failed");
                self.clear_path();
                false
            }
        }
    }

    /// Steer toward the next waypoint at `speed`.
    ///
    /// Waypoints on another floor are stair arrivals: the agent steps onto
    /// that floor directly. Returns `Arrived` once the last waypoint is
    /// reached (the path is cleared) or when there is no path.
    pub(crate) fn follow_path(&mut self, speed: f32, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) -> PathProgress {
        let reach = ctx.config.waypoint_reach_distance;
        let waypoint = loop {
            let next = self
                .current_path
                .as_ref()
                .and_then(|path| path.get(self.current_waypoint_index))
                .copied();
            let Some(waypoint) = next else {
                self.clear_path();
                self.body.velocity = Vec2::ZERO;
                return PathProgress::Arrived;
            };

            if waypoint.floor != self.current_floor {
                self.change_floor(waypoint);
                self.current_waypoint_index += 1;
                return PathProgress::Moving;
            }
            if self.position().distance(waypoint.position) <= reach {
                self.current_waypoint_index += 1;
                continue;
            }
            break waypoint;
        };

        let heading = (waypoint.position - self.position()).normalize_or_zero();
        if heading != Vec2::ZERO {
            self.view_direction = heading;
        }
        self.body.velocity = heading * speed;
        self.recover_from_door(heading, ctx, outcome);
        PathProgress::Moving
    }

    /// Step onto another floor at a stair arrival point
    pub(crate) fn change_floor(&mut self, arrival: FloorPoint) {
        tracing::trace!(agent = self.id.0, from = self.current_floor, to = arrival.floor, "took stairs");
        self.current_floor = arrival.floor;
        self.body.position = arrival.position;
        self.body.velocity = Vec2::ZERO;
        self.last_position = arrival.position;
        self.expected_step = 0.0;
    }

    /// Walk straight toward a point, no path
    pub(crate) fn steer_toward(&mut self, target: Vec2, speed: f32) {
        let heading = (target - self.position()).normalize_or_zero();
        if heading != Vec2::ZERO {
            self.view_direction = heading;
        }
        self.body.velocity = heading * speed;
    }

    /// Open a closed door the agent is pressed against.
    ///
    /// Triggers when last tick's displacement fell short of what its
    /// velocity should have produced and a closed door lies within reach
    /// roughly ahead. Zeroes velocity for this tick and starts the door
    /// cooldown.
    pub(crate) fn recover_from_door(&mut self, heading: Vec2, ctx: &AgentContext<'_>, outcome: &mut AgentOutcome) -> bool {
        let config = ctx.config;
        if self.timers.door_cooldown > 0.0 || self.expected_step <= 0.0 || heading == Vec2::ZERO {
            return false;
        }
        let moved = self.position().distance(self.last_position);
        if moved >= self.expected_step * config.stuck_progress_ratio {
            return false;
        }

        let position = self.position();
        let reach = self.body.size * config.door_reach_factor;
        let door = ctx
            .doors(self.building, self.current_floor)
            .into_iter()
            .find(|(_, door)| {
                if door.is_open() {
                    return false;
                }
                let closest = position.clamp(door.rect.min(), door.rect.max());
                let offset = closest - position;
                if offset.length() > reach {
                    return false;
                }
                let toward = if offset.length_squared() > f32::EPSILON {
                    offset.normalize()
                } else {
                    (door.rect.center - position).normalize_or_zero()
                };
                heading.dot(toward) > config.door_alignment
            });

        let Some((request, _)) = door else {
            return false;
        };
        tracing::trace!(agent = self.id.0, door = request.door.0, "opening door blocking path");
        outcome.door = Some(request);
        self.body.velocity = Vec2::ZERO;
        self.timers.door_cooldown = config.door_cooldown;
        true
    }
}
