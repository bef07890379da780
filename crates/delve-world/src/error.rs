use delve_core::types::ChunkKey;
use thiserror::Error;

/// Failures surfaced by [`crate::TerrainStreamer`].
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("fatal upload failure for chunk {key}: {reason}")]
    Upload { key: ChunkKey, reason: String },

    #[error("job dispatcher disconnected")]
    DispatcherDisconnected,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
