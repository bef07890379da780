use crate::constants::CHUNK_SIZE;
use crate::types::{ChunkKey, LocalCoord};
use glam::{IVec3, Vec3};

/// Convert a world-space position to the key of the chunk containing it.
/// Floor division, so negative positions land in negative chunks.
pub fn world_to_chunk(world: Vec3) -> ChunkKey {
    let cs = CHUNK_SIZE as f32;
    IVec3::new(
        (world.x / cs).floor() as i32,
        (world.y / cs).floor() as i32,
        (world.z / cs).floor() as i32,
    )
}

/// Convert an integer lattice position to the key of the chunk containing it.
pub fn lattice_to_chunk(lattice: IVec3) -> ChunkKey {
    let cs = CHUNK_SIZE as i32;
    IVec3::new(
        lattice.x.div_euclid(cs),
        lattice.y.div_euclid(cs),
        lattice.z.div_euclid(cs),
    )
}

/// World-space position of a chunk's local (0, 0, 0) sample.
pub fn chunk_origin(key: ChunkKey) -> Vec3 {
    (key * CHUNK_SIZE as i32).as_vec3()
}

/// Convert a world-space position to its offset within the containing chunk.
pub fn world_to_local(world: Vec3) -> Vec3 {
    world - chunk_origin(world_to_chunk(world))
}

/// Convert a chunk key and local lattice offset back to world-space.
pub fn chunk_local_to_world(key: ChunkKey, local: LocalCoord) -> Vec3 {
    (key * CHUNK_SIZE as i32 + local).as_vec3()
}

/// World-space AABB covered by a chunk's sample lattice.
///
/// Samples sit at integer offsets 0..CHUNK_SIZE-1, so the box spans
/// CHUNK_SIZE - 1 units per axis from the origin.
pub fn chunk_bounds(key: ChunkKey) -> (Vec3, Vec3) {
    let min = chunk_origin(key);
    (min, min + Vec3::splat((CHUNK_SIZE - 1) as f32))
}

/// Whether a local coordinate lies inside a chunk lattice.
pub fn in_chunk_bounds(x: i32, y: i32, z: i32) -> bool {
    let cs = CHUNK_SIZE as i32;
    (0..cs).contains(&x) && (0..cs).contains(&y) && (0..cs).contains(&z)
}

/// Flat sample index `x + y*N + z*N^2` for a lattice of edge `edge`.
/// Callers guarantee the coordinate is in range.
#[inline]
pub fn flat_index(x: usize, y: usize, z: usize, edge: usize) -> usize {
    x + y * edge + z * edge * edge
}

/// Hermite smoothstep weight `3t^2 - 2t^3` on t in [0, 1].
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
