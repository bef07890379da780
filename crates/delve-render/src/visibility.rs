use delve_core::math::{chunk_bounds, chunk_origin};
use delve_core::constants::CHUNK_SIZE;
use delve_core::types::{ChunkKey, GpuMeshHandle};
use glam::Vec3;

use crate::frustum::Frustum;

/// Keep the render-ready chunks whose lattice bounds touch the frustum.
pub fn visible_chunks<I>(ready: I, frustum: &Frustum) -> Vec<(ChunkKey, GpuMeshHandle)>
where
    I: IntoIterator<Item = (ChunkKey, GpuMeshHandle)>,
{
    ready
        .into_iter()
        .filter(|(key, _)| {
            let (min, max) = chunk_bounds(*key);
            frustum.test_aabb(min, max)
        })
        .collect()
}

/// Order chunks nearest-first by the distance from `eye` to each chunk center.
pub fn sort_front_to_back(chunks: &mut [(ChunkKey, GpuMeshHandle)], eye: Vec3) {
    let half = Vec3::splat((CHUNK_SIZE - 1) as f32 * 0.5);
    chunks.sort_by(|(a, _), (b, _)| {
        let da = (chunk_origin(*a) + half).distance_squared(eye);
        let db = (chunk_origin(*b) + half).distance_squared(eye);
        da.total_cmp(&db)
    });
}
