//! Deterministic hashing and biome noise for procedural placement

use noise::{Fbm, MultiFractal, Perlin};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Mix chunk coordinates and the world seed into a stream seed.
///
/// SplitMix64 finaliser over a linear combination; neighbouring chunks get
/// unrelated streams.
pub fn chunk_seed(x: i32, y: i32, world_seed: u64) -> u64 {
    let mut z = world_seed
        ^ (x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seeded random stream for a chunk
pub fn chunk_rng(x: i32, y: i32, world_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(chunk_seed(x, y, world_seed))
}

/// Seeded fractal Perlin field used to classify biomes
pub fn biome_noise(world_seed: u64, octaves: usize, persistence: f64) -> Fbm<Perlin> {
    // Fold the high half in so seeds differing only above bit 32 still differ
    let seed = (world_seed ^ (world_seed >> 32)) as u32;
    Fbm::<Perlin>::new(seed)
        .set_octaves(octaves)
        .set_persistence(persistence)
}
