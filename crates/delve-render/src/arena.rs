//! CPU-side stand-in for a GPU mesh heap.
//!
//! Interleaves each uploaded mesh into a `MeshVertex` buffer with the same
//! layout a vertex shader would read, picks the narrowest index format, and
//! tracks byte usage against an optional budget.

use std::collections::HashMap;

use delve_core::math::chunk_origin;
use delve_core::types::{ChunkKey, GpuMeshHandle};
use delve_mesh::Mesh;
use delve_world::{MeshUploader, UploadError};

/// Interleaved vertex, 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// One resident chunk mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentMesh {
    pub key: ChunkKey,
    /// World-space translation for the chunk-local vertices.
    pub origin: [f32; 3],
    pub vertices: Vec<MeshVertex>,
    pub indices: IndexBuffer,
}

impl ResidentMesh {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn byte_size(&self) -> usize {
        self.vertex_bytes().len() + self.indices.as_bytes().len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Counters for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub resident: usize,
    pub used_bytes: usize,
    pub uploads: u64,
    pub releases: u64,
    pub deferred: u64,
}

/// Mesh store implementing [`MeshUploader`].
#[derive(Debug, Default)]
pub struct MeshArena {
    meshes: HashMap<GpuMeshHandle, ResidentMesh>,
    next_handle: u64,
    budget_bytes: Option<usize>,
    stats: ArenaStats,
}

impl MeshArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena that defers uploads once `budget_bytes` are resident.
    pub fn with_budget(budget_bytes: usize) -> Self {
        Self {
            budget_bytes: Some(budget_bytes),
            ..Self::default()
        }
    }

    pub fn get(&self, handle: GpuMeshHandle) -> Option<&ResidentMesh> {
        self.meshes.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            resident: self.meshes.len(),
            ..self.stats
        }
    }
}

fn interleave(mesh: &Mesh) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(&position, &normal)| MeshVertex { position, normal })
        .collect()
}

impl MeshUploader for MeshArena {
    fn upload(&mut self, key: ChunkKey, mesh: &Mesh) -> Result<GpuMeshHandle, UploadError> {
        if mesh.normals.len() != mesh.positions.len() {
            return Err(UploadError::Fatal(format!(
                "chunk {key}: {} normals for {} positions",
                mesh.normals.len(),
                mesh.positions.len()
            )));
        }

        let indices = match mesh.indices_u16() {
            Some(narrow) => IndexBuffer::U16(narrow),
            None => IndexBuffer::U32(mesh.indices.clone()),
        };
        let resident = ResidentMesh {
            key,
            origin: chunk_origin(key).to_array(),
            vertices: interleave(mesh),
            indices,
        };
        let size = resident.byte_size();

        if let Some(budget) = self.budget_bytes {
            if size > budget {
                return Err(UploadError::Fatal(format!(
                    "chunk {key}: {size} bytes exceeds arena budget {budget}"
                )));
            }
            if self.stats.used_bytes + size > budget {
                self.stats.deferred += 1;
                return Err(UploadError::Retry(format!(
                    "arena full ({} of {} bytes)",
                    self.stats.used_bytes, budget
                )));
            }
        }

        self.next_handle += 1;
        let handle = GpuMeshHandle(self.next_handle);
        self.stats.used_bytes += size;
        self.stats.uploads += 1;
        self.meshes.insert(handle, resident);
        Ok(handle)
    }

    fn release(&mut self, handle: GpuMeshHandle) {
        match self.meshes.remove(&handle) {
            Some(resident) => {
                self.stats.used_bytes -= resident.byte_size();
                self.stats.releases += 1;
            }
            None => log::warn!("Release of unknown mesh handle {:?}", handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec3, Vec3};

    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.push_triangle([Vec3::ZERO, Vec3::X, Vec3::Z], [Vec3::Y; 3]);
        mesh.push_triangle([Vec3::X, Vec3::new(1.0, 0.0, 1.0), Vec3::Z], [Vec3::Y; 3]);
        mesh
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
    }

    #[test]
    fn test_upload_interleaves_and_narrows() {
        let mut arena = MeshArena::new();
        let key = IVec3::new(2, 0, -1);
        let handle = arena.upload(key, &quad()).expect("fits");
        let resident = arena.get(handle).expect("resident");

        assert_eq!(resident.key, key);
        assert_eq!(resident.origin, [32.0, 0.0, -16.0]);
        assert_eq!(resident.vertices.len(), 6);
        assert_eq!(resident.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(resident.vertices[1].normal, [0.0, 1.0, 0.0]);
        assert!(matches!(resident.indices, IndexBuffer::U16(_)));
        assert_eq!(resident.triangle_count(), 2);
        assert_eq!(resident.byte_size(), 6 * 24 + 6 * 2);
    }

    #[test]
    fn test_release_returns_bytes() {
        let mut arena = MeshArena::new();
        let a = arena.upload(IVec3::ZERO, &quad()).expect("fits");
        let b = arena.upload(IVec3::X, &quad()).expect("fits");
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);

        arena.release(a);
        let stats = arena.stats();
        assert_eq!(stats.resident, 1);
        assert_eq!(stats.used_bytes, 156);
        assert_eq!(stats.uploads, 2);
        assert_eq!(stats.releases, 1);

        // Unknown handles are ignored.
        arena.release(a);
        assert_eq!(arena.stats().releases, 1);
    }

    #[test]
    fn test_empty_mesh_still_gets_handle() {
        let mut arena = MeshArena::new();
        let handle = arena.upload(IVec3::ZERO, &Mesh::new()).expect("empty fits");
        assert!(arena.get(handle).expect("resident").indices.is_empty());
    }

    #[test]
    fn test_budget_defers_then_admits() {
        let mut arena = MeshArena::with_budget(200);
        let first = arena.upload(IVec3::ZERO, &quad()).expect("fits");
        match arena.upload(IVec3::X, &quad()) {
            Err(UploadError::Retry(_)) => {}
            other => panic!("expected retry, got {other:?}"),
        }
        assert_eq!(arena.stats().deferred, 1);

        arena.release(first);
        arena.upload(IVec3::X, &quad()).expect("fits after release");
    }

    #[test]
    fn test_oversized_mesh_is_fatal() {
        let mut arena = MeshArena::with_budget(64);
        assert!(matches!(
            arena.upload(IVec3::ZERO, &quad()),
            Err(UploadError::Fatal(_))
        ));
    }

    #[test]
    fn test_mismatched_normals_fatal() {
        let mut mesh = quad();
        mesh.normals.pop();
        let mut arena = MeshArena::new();
        assert!(matches!(arena.upload(IVec3::ZERO, &mesh), Err(UploadError::Fatal(_))));
    }
}
