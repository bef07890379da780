use delve_core::types::{ChunkKey, GpuMeshHandle};
use delve_mesh::Mesh;
use thiserror::Error;

/// Why a mesh upload did not produce a handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Transient; the mesh is offered again on a later pass.
    #[error("upload deferred: {0}")]
    Retry(String),

    /// Unrecoverable; surfaced to the caller of `process_until`.
    #[error("upload failed: {0}")]
    Fatal(String),
}

/// Host-side owner of GPU mesh resources.
pub trait MeshUploader {
    /// Submit a mesh and return the handle that now owns its resources.
    fn upload(&mut self, key: ChunkKey, mesh: &Mesh) -> Result<GpuMeshHandle, UploadError>;

    /// Free the resources behind a handle returned by `upload`.
    fn release(&mut self, handle: GpuMeshHandle);
}
