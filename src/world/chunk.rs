//! Chunks and their procedural content
//!
//! Everything a chunk holds is derived from one random stream seeded by
//! `(chunk x, chunk y, world seed)`. Generating the same coordinates twice
//! with the same seed yields identical content.

use std::sync::Arc;

use glam::Vec2;
use noise::NoiseFn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::ChunkCoord;
use crate::spatial::geometry::Rect;
use crate::spatial::SpatialQuery;
use crate::world::noise::{biome_noise, chunk_rng};
use crate::world::obstacles::Obstacle;
use crate::world::settlement::{Settlement, SETTLEMENT_HALF_EXTENT};

const TRUNK_SIZE: f32 = 20.0;
const CANOPY_RADIUS: f32 = 44.0;
const BIOME_OCTAVES: usize = 3;
const BIOME_PERSISTENCE: f64 = 0.5;
/// Settlement centres keep this far from the chunk edge
const SETTLEMENT_EDGE_MARGIN: f32 = SETTLEMENT_HALF_EXTENT + 32.0;

/// A tree: a blocking trunk under a purely visual canopy
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub position: Vec2,
    pub trunk: Obstacle,
    pub canopy_radius: f32,
}

impl Tree {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            trunk: Obstacle::trunk(Rect::new(position, Vec2::splat(TRUNK_SIZE))),
            canopy_radius: CANOPY_RADIUS,
        }
    }
}

impl SpatialQuery for Tree {
    fn rect_data(&self) -> Rect {
        Rect::new(self.position, Vec2::splat(self.canopy_radius * 2.0))
    }

    fn sort_y(&self) -> f32 {
        self.trunk.rect.max().y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorationKind {
    Rock,
    Bush,
    Flowers,
    Debris,
}

/// Non-blocking scenery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub position: Vec2,
    pub kind: DecorationKind,
}

impl SpatialQuery for Decoration {
    fn rect_data(&self) -> Rect {
        Rect::new(self.position, Vec2::splat(16.0))
    }
}

/// Freshly generated content of one chunk
#[derive(Debug, Clone)]
pub struct ChunkContent {
    pub settlement: Option<Settlement>,
    pub trees: Vec<Tree>,
    pub decorations: Vec<Decoration>,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub settlement: Option<Settlement>,
    pub trees: Vec<Tree>,
    pub decorations: Vec<Decoration>,
    pub generated: bool,
    /// World clock (seconds) of the last time the chunk was in the active set
    pub last_access: f64,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            settlement: None,
            trees: Vec::new(),
            decorations: Vec::new(),
            generated: false,
            last_access: 0.0,
        }
    }

    /// Fill the chunk; a no-op once generated
    pub fn generate(&mut self, world_seed: u64, config: &Arc<SimulationConfig>) {
        if self.generated {
            return;
        }
        let content = generate_chunk_content(self.coord, world_seed, config);
        self.settlement = content.settlement;
        self.trees = content.trees;
        self.decorations = content.decorations;
        self.generated = true;
    }

    pub fn bounds(&self, chunk_size: f32) -> Rect {
        let origin = self.coord.origin(chunk_size);
        Rect::from_min_max(origin, origin + Vec2::splat(chunk_size))
    }
}

/// Deterministically generate the content of the chunk at `coord`.
///
/// Draw order from the chunk stream: settlement roll (and layout), tree
/// candidates, decoration tiles.
pub fn generate_chunk_content(coord: ChunkCoord, world_seed: u64, config: &Arc<SimulationConfig>) -> ChunkContent {
    let world = &config.world;
    let mut rng = chunk_rng(coord.x, coord.y, world_seed);
    let size = world.chunk_size;
    let origin = coord.origin(size);

    // === SETTLEMENT ===
    let settlement_roll: f32 = rng.gen();
    let settlement = if coord != ChunkCoord::new(0, 0) && settlement_roll < world.settlement_probability {
        let lo = origin + Vec2::splat(SETTLEMENT_EDGE_MARGIN);
        let hi = origin + Vec2::splat(size - SETTLEMENT_EDGE_MARGIN);
        let center = Vec2::new(rng.gen_range(lo.x..=hi.x), rng.gen_range(lo.y..=hi.y)).round();
        let clear_of_spawn = center.length() > world.spawn_clear_radius + SETTLEMENT_HALF_EXTENT * std::f32::consts::SQRT_2;
        clear_of_spawn.then(|| Settlement::generate(coord, center, Arc::clone(config), &mut rng))
    } else {
        None
    };
    let exclusion = settlement.as_ref().map(|s| s.bounds.expanded(world.settlement_tree_margin));

    // === TREES ===
    let biome = biome_noise(world_seed, BIOME_OCTAVES, BIOME_PERSISTENCE);
    let mut trees: Vec<Tree> = Vec::new();
    for _ in 0..world.tree_attempts_per_chunk {
        let position = origin + Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()) * size;
        let density_roll: f32 = rng.gen();

        let forest = biome.get([
            f64::from(position.x * world.tree_noise_scale),
            f64::from(position.y * world.tree_noise_scale),
        ]) as f32;
        if forest < world.tree_noise_threshold || density_roll > world.tree_density {
            continue;
        }
        if position.length() < world.spawn_clear_radius {
            continue;
        }
        if exclusion.is_some_and(|r| r.contains(position)) {
            continue;
        }
        if trees.iter().any(|t| t.position.distance(position) < world.tree_min_spacing) {
            continue;
        }
        trees.push(Tree::new(position));
    }

    // === DECORATIONS ===
    let tile = world.decoration_tile_size;
    let per_axis = (size / tile).floor() as i32;
    let mut decorations = Vec::new();
    for ty in 0..per_axis {
        for tx in 0..per_axis {
            if rng.gen::<f32>() >= world.decoration_probability {
                continue;
            }
            let kind = match rng.gen_range(0..100) {
                0..=39 => DecorationKind::Bush,
                40..=69 => DecorationKind::Rock,
                70..=89 => DecorationKind::Flowers,
                _ => DecorationKind::Debris,
            };
            let position = origin + (Vec2::new(tx as f32, ty as f32) + 0.5) * tile;
            if exclusion.is_some_and(|r| r.contains(position)) {
                continue;
            }
            decorations.push(Decoration { position, kind });
        }
    }

    ChunkContent {
        settlement,
        trees,
        decorations,
    }
}
