//! Procedural multi-floor building layout
//!
//! Every floor is a perimeter with a corridor along the bottom edge and a
//! row of rooms above it. Each room opens onto the corridor through its own
//! door; only the ground floor has an external door. Room doors start open,
//! the external door starts closed. Adjacent floors are joined by one stair
//! pair placed where a room on each floor overlaps.

use glam::Vec2;
use rand::Rng;

use crate::core::types::BuildingId;
use crate::spatial::geometry::Rect;
use crate::structures::building::{Building, Floor, Room};
use crate::world::obstacles::{InteractableKind, Obstacle, ObstacleId, ObstacleKind, ObstacleSet, StairLink};

pub const WALL_THICKNESS: f32 = 16.0;
pub const CORRIDOR_HEIGHT: f32 = 96.0;
/// Wide enough that at least one full path cell fits through the gap
pub const DOOR_WIDTH: f32 = 72.0;
pub const MIN_ROOM_WIDTH: f32 = 110.0;
const MAX_ROOM_WIDTH: f32 = 200.0;
/// Distance kept between a room door and the room's side walls
const DOOR_EDGE_MARGIN: f32 = 8.0;

pub const STAIR_SIZE: f32 = 40.0;
const STAIR_MARGIN: f32 = 16.0;
const STAIR_ATTEMPTS: u32 = 30;
const STAIR_DOOR_CLEARANCE: f32 = 64.0;

const INTERACTABLE_ATTEMPTS: u32 = 20;
const MAX_INTERACTABLES_PER_ROOM: u32 = 2;
const PROP_WALL_CLEARANCE: f32 = 12.0;
const PROP_DOOR_CLEARANCE: f32 = 56.0;
const PROP_SPACING: f32 = 48.0;

/// Generate a building centered on `position`
pub fn generate(id: BuildingId, position: Vec2, size: Vec2, num_floors: usize, rng: &mut impl Rng) -> Building {
    let bounds = Rect::new(position, size);
    let num_floors = num_floors.max(1);

    let mut floors: Vec<Floor> = (0..num_floors).map(|level| layout_floor(level, &bounds, rng)).collect();

    for level in 0..num_floors - 1 {
        if !place_stairs(&mut floors, level, rng) {
            tracing::warn!(
                building = id.0,
                lower = level,
                upper = level + 1,
                "no room pair fits a stair connection, floors left unconnected"
            );
        }
    }

    for floor in &mut floors {
        scatter_interactables(id, floor, rng);
    }

    Building::new(id, bounds, floors)
}

/// Perimeter, corridor, rooms and their doors for one floor
fn layout_floor(level: usize, bounds: &Rect, rng: &mut impl Rng) -> Floor {
    let t = WALL_THICKNESS;
    let min = bounds.min();
    let max = bounds.max();
    let inner_min = min + Vec2::splat(t);
    let inner_max = max - Vec2::splat(t);

    let corridor = Rect::from_min_max(Vec2::new(inner_min.x, inner_max.y - CORRIDOR_HEIGHT), inner_max);
    let divider_top = corridor.min().y - t;

    let mut obstacles = ObstacleSet::new();

    // Perimeter
    obstacles.add(Obstacle::wall(Rect::from_min_max(min, Vec2::new(max.x, min.y + t))));
    obstacles.add(Obstacle::wall(Rect::from_min_max(
        Vec2::new(min.x, min.y + t),
        Vec2::new(min.x + t, max.y - t),
    )));
    obstacles.add(Obstacle::wall(Rect::from_min_max(
        Vec2::new(max.x - t, min.y + t),
        Vec2::new(max.x, max.y - t),
    )));
    let external_doors = if level == 0 {
        let half = DOOR_WIDTH * 0.5;
        let door_x = rng.gen_range(inner_min.x + half + t..=(inner_max.x - half - t).max(inner_min.x + half + t));
        vec![door_x]
    } else {
        Vec::new()
    };
    wall_with_doors(&mut obstacles, min.x, max.x, max.y - t, max.y, &external_doors, false);

    // Rooms and partitions
    let spans = room_spans(inner_min.x, inner_max.x, rng);
    for pair in spans.windows(2) {
        let (_, end) = pair[0];
        obstacles.add(Obstacle::wall(Rect::from_min_max(
            Vec2::new(end, inner_min.y),
            Vec2::new(end + t, divider_top),
        )));
    }

    // Corridor wall with one door per room
    let half = DOOR_WIDTH * 0.5;
    let door_centers: Vec<f32> = spans
        .iter()
        .map(|&(start, end)| {
            let lo = start + half + DOOR_EDGE_MARGIN;
            let hi = (end - half - DOOR_EDGE_MARGIN).max(lo);
            rng.gen_range(lo..=hi)
        })
        .collect();
    let doors = wall_with_doors(&mut obstacles, inner_min.x, inner_max.x, divider_top, divider_top + t, &door_centers, true);

    let rooms = spans
        .iter()
        .zip(doors)
        .map(|(&(start, end), door)| Room {
            rect: Rect::from_min_max(Vec2::new(start, inner_min.y), Vec2::new(end, divider_top)),
            door,
        })
        .collect();

    Floor {
        level,
        obstacles,
        rooms,
        corridor,
    }
}

/// Split `[left, right]` into non-overlapping room spans separated by one
/// wall thickness. A trailing gap too narrow for a room is absorbed into
/// the last room.
fn room_spans(left: f32, right: f32, rng: &mut impl Rng) -> Vec<(f32, f32)> {
    let mut spans = Vec::new();
    let mut x = left;
    while right - x >= MIN_ROOM_WIDTH {
        let remaining = right - x;
        let mut width = rng.gen_range(MIN_ROOM_WIDTH..=MAX_ROOM_WIDTH).min(remaining);
        if remaining - width < MIN_ROOM_WIDTH + WALL_THICKNESS {
            width = remaining;
        }
        spans.push((x, x + width));
        x += width + WALL_THICKNESS;
    }
    spans
}

/// Horizontal wall from `x0` to `x1` with a door centered on each entry of
/// `door_centers`. Returns the door handles in input order.
fn wall_with_doors(
    obstacles: &mut ObstacleSet,
    x0: f32,
    x1: f32,
    y0: f32,
    y1: f32,
    door_centers: &[f32],
    open: bool,
) -> Vec<ObstacleId> {
    let half = DOOR_WIDTH * 0.5;
    let mut order: Vec<usize> = (0..door_centers.len()).collect();
    order.sort_by(|&a, &b| door_centers[a].total_cmp(&door_centers[b]));

    let mut ids = vec![ObstacleId(0); door_centers.len()];
    let mut cursor = x0;
    for i in order {
        let gap_start = door_centers[i] - half;
        let gap_end = door_centers[i] + half;
        if gap_start > cursor {
            obstacles.add(Obstacle::wall(Rect::from_min_max(Vec2::new(cursor, y0), Vec2::new(gap_start, y1))));
        }
        ids[i] = obstacles.add(Obstacle::door(Rect::from_min_max(
            Vec2::new(gap_start, y0),
            Vec2::new(gap_end, y1),
        )));
        obstacles.set_door_open(ids[i], open);
        cursor = gap_end;
    }
    if x1 > cursor {
        obstacles.add(Obstacle::wall(Rect::from_min_max(Vec2::new(cursor, y0), Vec2::new(x1, y1))));
    }
    ids
}

/// Place a reciprocal stair pair between `level` and `level + 1`.
///
/// Candidate sites come from room pairs whose horizontal extents overlap
/// enough for a stair plus margins. Returns false when the retry budget
/// runs out.
fn place_stairs(floors: &mut [Floor], level: usize, rng: &mut impl Rng) -> bool {
    let (lower_floors, upper_floors) = floors.split_at_mut(level + 1);
    let lower = &mut lower_floors[level];
    let upper = &mut upper_floors[0];

    let needed = STAIR_SIZE + 2.0 * STAIR_MARGIN;
    let candidates: Vec<(Rect, Rect)> = lower
        .rooms
        .iter()
        .flat_map(|a| upper.rooms.iter().map(move |b| (a.rect, b.rect)))
        .filter(|(a, b)| a.overlap_x(b) >= needed)
        .collect();
    if candidates.is_empty() {
        return false;
    }

    let inset = STAIR_MARGIN + STAIR_SIZE * 0.5;
    for _ in 0..STAIR_ATTEMPTS {
        let (a, b) = candidates[rng.gen_range(0..candidates.len())];
        let lo = a.min().max(b.min()) + Vec2::splat(inset);
        let hi = a.max().min(b.max()) - Vec2::splat(inset);
        if lo.x > hi.x || lo.y > hi.y {
            continue;
        }

        let site = Vec2::new(rng.gen_range(lo.x..=hi.x), rng.gen_range(lo.y..=hi.y));
        let rect = Rect::new(site, Vec2::splat(STAIR_SIZE));
        if !stair_site_clear(lower, &rect) || !stair_site_clear(upper, &rect) {
            continue;
        }

        lower.obstacles.add(Obstacle::stairs(
            rect,
            StairLink {
                target_floor: level + 1,
                target_position: site,
            },
        ));
        upper.obstacles.add(Obstacle::stairs(
            rect,
            StairLink {
                target_floor: level,
                target_position: site,
            },
        ));
        return true;
    }
    false
}

fn stair_site_clear(floor: &Floor, rect: &Rect) -> bool {
    floor.obstacles.iter().all(|o| match o.kind {
        ObstacleKind::Door { .. } => o.rect.center.distance(rect.center) >= STAIR_DOOR_CLEARANCE,
        ObstacleKind::Stairs(_) => !o.rect.intersects(&rect.expanded(STAIR_MARGIN)),
        _ => !o.blocks_movement() || !o.rect.intersects(rect),
    })
}

/// Weighted 50/30/20 roll
fn roll_interactable(rng: &mut impl Rng) -> InteractableKind {
    match rng.gen_range(0..100) {
        0..=49 => InteractableKind::Container,
        50..=79 => InteractableKind::Medkit,
        _ => InteractableKind::Generator,
    }
}

fn scatter_interactables(id: BuildingId, floor: &mut Floor, rng: &mut impl Rng) {
    let rooms: Vec<Rect> = floor.rooms.iter().map(|r| r.rect).collect();
    for room in rooms {
        let count = rng.gen_range(0..=MAX_INTERACTABLES_PER_ROOM);
        for _ in 0..count {
            let kind = roll_interactable(rng);
            if !place_interactable(floor, &room, kind, rng) {
                tracing::warn!(building = id.0, floor = floor.level, ?kind, "interactable placement exhausted, skipped");
            }
        }
    }
}

fn place_interactable(floor: &mut Floor, room: &Rect, kind: InteractableKind, rng: &mut impl Rng) -> bool {
    let half = kind.footprint() * 0.5;
    let lo = room.min() + Vec2::splat(PROP_WALL_CLEARANCE) + half;
    let hi = room.max() - Vec2::splat(PROP_WALL_CLEARANCE) - half;
    if lo.x > hi.x || lo.y > hi.y {
        return false;
    }

    for _ in 0..INTERACTABLE_ATTEMPTS {
        let site = Vec2::new(rng.gen_range(lo.x..=hi.x), rng.gen_range(lo.y..=hi.y));
        let rect = Rect::new(site, kind.footprint());
        let clear = floor.obstacles.iter().all(|o| match o.kind {
            ObstacleKind::Door { .. } | ObstacleKind::Stairs(_) => o.rect.center.distance(site) >= PROP_DOOR_CLEARANCE,
            ObstacleKind::Interactable { .. } => o.rect.center.distance(site) >= PROP_SPACING,
            ObstacleKind::Wall | ObstacleKind::Trunk => !o.rect.intersects(&rect.expanded(PROP_WALL_CLEARANCE)),
        });
        if clear {
            floor.obstacles.add(Obstacle::interactable(site, kind));
            return true;
        }
    }
    false
}
