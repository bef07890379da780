use delve_core::constants::{CHUNK_SIZE, OCTAVE_SEED_STRIDE, SAMPLES_PER_CHUNK};
use delve_core::math::{chunk_origin, flat_index, smoothstep};
use delve_core::types::ChunkKey;
use delve_core::TerrainParams;
use std::sync::Arc;

use crate::dispatch::DensitySource;

/// Integer lattice hash. Wrapping multiply-xorshift mixing, so every
/// (ix, iz, seed) triple maps to a fixed 32-bit value on every platform.
pub fn lattice_hash(ix: i32, iz: i32, seed: u32) -> u32 {
    let mut h = (ix as u32)
        .wrapping_mul(0x9E37_79B9)
        .wrapping_add((iz as u32).wrapping_mul(0x517C_C1B7))
        .wrapping_add(seed.wrapping_mul(0x2545_F491));
    h ^= h >> 16;
    h = h.wrapping_mul(0x045D_9F3B);
    h ^= h >> 16;
    h = h.wrapping_mul(0x045D_9F3B);
    h ^= h >> 16;
    h
}

/// Lattice value in [-1, 1). Uses the top 24 bits so the conversion is exact.
fn lattice_value(ix: i32, iz: i32, seed: u32) -> f32 {
    let unit = (lattice_hash(ix, iz, seed) >> 8) as f32 / 16_777_216.0;
    unit * 2.0 - 1.0
}

/// Smooth 2D value noise: bilinear blend of the four surrounding lattice
/// values with smoothstep weights. Returns exactly the lattice value at
/// integer coordinates.
pub fn value_noise_2d(x: f32, z: f32, seed: u32) -> f32 {
    let x0 = x.floor();
    let z0 = z.floor();
    let ix = x0 as i32;
    let iz = z0 as i32;
    let tx = smoothstep(x - x0);
    let tz = smoothstep(z - z0);

    let v00 = lattice_value(ix, iz, seed);
    let v10 = lattice_value(ix.wrapping_add(1), iz, seed);
    let v01 = lattice_value(ix, iz.wrapping_add(1), seed);
    let v11 = lattice_value(ix.wrapping_add(1), iz.wrapping_add(1), seed);

    let near = v00 + (v10 - v00) * tx;
    let far = v01 + (v11 - v01) * tx;
    near + (far - near) * tz
}

/// Fractional Brownian motion over [`value_noise_2d`], normalized by the
/// summed octave amplitudes. Zero octaves yields 0.
pub fn fbm(x: f32, z: f32, params: &TerrainParams) -> f32 {
    let mut sum = 0.0f32;
    let mut norm = 0.0f32;
    let mut amplitude = 1.0f32;
    let mut frequency = 1.0f32;

    for octave in 0..params.octaves {
        let seed = params
            .seed
            .wrapping_add(octave.wrapping_mul(OCTAVE_SEED_STRIDE));
        sum += amplitude * value_noise_2d(x * frequency, z * frequency, seed);
        norm += amplitude;
        amplitude *= params.gain;
        frequency *= params.lacunarity;
    }

    if norm == 0.0 {
        0.0
    } else {
        sum / norm
    }
}

/// Terrain surface altitude at world (x, z).
pub fn height_surface(x: f32, z: f32, params: &TerrainParams) -> f32 {
    params.base_height + params.amplitude * fbm(x * params.world_scale, z * params.world_scale, params)
}

/// Signed density at a world position: negative below the surface (solid),
/// non-negative above it (air).
pub fn density(x: f32, y: f32, z: f32, params: &TerrainParams) -> f32 {
    y - height_surface(x, z, params)
}

/// Fill a chunk's density lattice in flat `x + y*N + z*N^2` order.
/// The height field is evaluated once per column.
pub fn fill_chunk(params: &TerrainParams, key: ChunkKey) -> Vec<f32> {
    let n = CHUNK_SIZE as usize;
    let origin = chunk_origin(key);
    let mut samples = vec![0.0f32; SAMPLES_PER_CHUNK as usize];

    for lz in 0..n {
        for lx in 0..n {
            let wx = origin.x + lx as f32;
            let wz = origin.z + lz as f32;
            let height = height_surface(wx, wz, params);
            for ly in 0..n {
                let wy = origin.y + ly as f32;
                samples[flat_index(lx, ly, lz, n)] = wy - height;
            }
        }
    }

    samples
}

/// Heightmap terrain generator bound to one parameter set.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    params: Arc<TerrainParams>,
}

impl TerrainGenerator {
    pub fn new(params: Arc<TerrainParams>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Arc<TerrainParams> {
        &self.params
    }

    /// Generate the density lattice for a chunk (CHUNK_SIZE^3 samples).
    pub fn generate_chunk(&self, key: ChunkKey) -> Vec<f32> {
        fill_chunk(&self.params, key)
    }

    /// Surface altitude at world (x, z).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        height_surface(x, z, &self.params)
    }

    /// Density at a world position.
    pub fn density_at(&self, x: f32, y: f32, z: f32) -> f32 {
        density(x, y, z, &self.params)
    }
}

impl DensitySource for TerrainGenerator {
    /// Uses the parameter snapshot carried by the job, not the generator's own.
    fn compute_densities(&self, params: &TerrainParams, key: ChunkKey) -> Vec<f32> {
        fill_chunk(params, key)
    }
}
