use delve_core::types::{ChunkKey, GpuMeshHandle, JobId};
use delve_core::Chunk;
use delve_mesh::Mesh;

/// Chunk lifecycle, strictly ordered. A record never moves backwards except
/// `Uploading -> Meshed` after a retryable upload failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkState {
    /// Tracked, nothing generated yet.
    Empty,
    /// Populate job in flight.
    Populating,
    /// Densities and mesh ready, waiting for an upload slot.
    Meshed,
    /// Mesh handed to the uploader this pass.
    Uploading,
    /// Mesh resident; render-ready until evicted.
    Uploaded,
}

/// Scheduler bookkeeping for one tracked chunk.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub key: ChunkKey,
    pub chunk: Chunk,
    pub state: ChunkState,
    /// Last frame whose streaming neighborhood included this key.
    pub last_touched_frame: u64,
    pub mesh: Option<Mesh>,
    pub gpu_handle: Option<GpuMeshHandle>,
    /// Id of the job whose result this record will accept.
    pub job_id: Option<JobId>,
    /// Whether the key currently sits in the work queue.
    pub queued: bool,
    /// The uploader rejected this mesh fatally. The record is not offered
    /// again until it is evicted and tracked afresh.
    pub upload_failed: bool,
}

impl ChunkRecord {
    pub fn new(key: ChunkKey, frame: u64) -> Self {
        Self {
            key,
            chunk: Chunk::new(key),
            state: ChunkState::Empty,
            last_touched_frame: frame,
            mesh: None,
            gpu_handle: None,
            job_id: None,
            queued: false,
            upload_failed: false,
        }
    }

    /// Nothing left to schedule for this record.
    pub fn is_terminal(&self) -> bool {
        self.state == ChunkState::Uploaded || self.upload_failed
    }

    pub fn is_render_ready(&self) -> bool {
        self.state == ChunkState::Uploaded && self.gpu_handle.is_some()
    }

    pub fn touch(&mut self, frame: u64) {
        self.last_touched_frame = self.last_touched_frame.max(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_new_record_is_empty() {
        let record = ChunkRecord::new(IVec3::new(1, 0, 2), 5);
        assert_eq!(record.state, ChunkState::Empty);
        assert_eq!(record.last_touched_frame, 5);
        assert!(record.mesh.is_none());
        assert!(record.gpu_handle.is_none());
        assert!(record.job_id.is_none());
        assert!(!record.queued);
        assert!(!record.upload_failed);
        assert!(!record.chunk.is_allocated());
        assert!(!record.is_terminal());
    }

    #[test]
    fn test_touch_never_rewinds() {
        let mut record = ChunkRecord::new(IVec3::ZERO, 10);
        record.touch(12);
        assert_eq!(record.last_touched_frame, 12);
        record.touch(3);
        assert_eq!(record.last_touched_frame, 12);
    }

    #[test]
    fn test_failed_upload_is_terminal() {
        let mut record = ChunkRecord::new(IVec3::ZERO, 0);
        record.state = ChunkState::Meshed;
        assert!(!record.is_terminal());
        record.upload_failed = true;
        assert!(record.is_terminal());
        assert!(!record.is_render_ready());
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(ChunkState::Empty < ChunkState::Populating);
        assert!(ChunkState::Populating < ChunkState::Meshed);
        assert!(ChunkState::Meshed < ChunkState::Uploading);
        assert!(ChunkState::Uploading < ChunkState::Uploaded);
    }
}
