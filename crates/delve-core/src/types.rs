use glam::IVec3;

/// Chunk key in chunk-space (each unit = CHUNK_SIZE samples).
pub type ChunkKey = IVec3;

/// Local lattice coordinate inside a chunk, each axis in [0, CHUNK_SIZE).
pub type LocalCoord = IVec3;

/// Identifier of one asynchronous populate job.
///
/// Handed out from a monotonically increasing counter. A completion is only
/// applied when its id still equals the id stored on the owning record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// Opaque handle to a mesh resource owned by the upload collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuMeshHandle(pub u64);
