//! Record transitions. Each function moves one record forward and leaves
//! queueing decisions to the caller.

use crate::chunk_map::ChunkMap;
use crate::dispatch::JobCompletion;
use crate::error::StreamError;
use crate::record::{ChunkRecord, ChunkState};
use crate::upload::{MeshUploader, UploadError};
use delve_core::types::{ChunkKey, JobId};

/// Result of offering a meshed record to the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// Retryable failure; the record is back in `Meshed`.
    Deferred,
}

/// `Empty -> Populating`: stamp the record with a fresh job id.
pub fn begin_populate(record: &mut ChunkRecord, job_id: JobId) {
    debug_assert_eq!(record.state, ChunkState::Empty);
    record.job_id = Some(job_id);
    record.state = ChunkState::Populating;
    log::debug!("Chunk {} populating as job {}", record.key, job_id.0);
}

/// `Populating -> Meshed` if the completion is still current.
///
/// Returns the key to re-enqueue when applied, or None for a stale result
/// (untracked key, superseded job id, or record not awaiting a job).
pub fn apply_completion(chunk_map: &mut ChunkMap, completion: JobCompletion) -> Option<ChunkKey> {
    let JobCompletion {
        key,
        job_id,
        densities,
        mesh,
    } = completion;

    let record = match chunk_map.get_mut(&key) {
        Some(record) => record,
        None => {
            log::trace!("Dropping job {} for untracked chunk {}", job_id.0, key);
            return None;
        }
    };
    if record.state != ChunkState::Populating || record.job_id != Some(job_id) {
        log::trace!(
            "Dropping stale job {} for chunk {} (current {:?}, {:?})",
            job_id.0,
            key,
            record.job_id,
            record.state
        );
        return None;
    }

    if let Err(e) = record.chunk.replace_samples(densities) {
        log::warn!("Chunk {} received malformed densities: {}", key, e);
        record.chunk.clear();
    }
    log::debug!(
        "Chunk {} meshed: {} triangles",
        key,
        mesh.triangle_count()
    );
    record.mesh = Some(mesh);
    record.state = ChunkState::Meshed;
    Some(key)
}

/// `Meshed -> Uploading -> Uploaded`, or back to `Meshed` on a retryable
/// failure. A fatal failure leaves the record in `Meshed`, marks it so it is
/// never offered again, and is returned.
pub fn upload_mesh(
    record: &mut ChunkRecord,
    uploader: &mut dyn MeshUploader,
) -> Result<UploadOutcome, StreamError> {
    debug_assert_eq!(record.state, ChunkState::Meshed);
    record.state = ChunkState::Uploading;

    let result = match record.mesh.as_ref() {
        Some(mesh) => uploader.upload(record.key, mesh),
        None => Err(UploadError::Fatal("meshed record has no mesh".into())),
    };

    match result {
        Ok(handle) => {
            record.gpu_handle = Some(handle);
            record.state = ChunkState::Uploaded;
            log::debug!("Chunk {} uploaded as {:?}", record.key, handle);
            Ok(UploadOutcome::Uploaded)
        }
        Err(UploadError::Retry(reason)) => {
            record.state = ChunkState::Meshed;
            log::warn!("Upload of chunk {} deferred: {}", record.key, reason);
            Ok(UploadOutcome::Deferred)
        }
        Err(UploadError::Fatal(reason)) => {
            record.state = ChunkState::Meshed;
            record.upload_failed = true;
            Err(StreamError::Upload {
                key: record.key,
                reason,
            })
        }
    }
}

/// Release everything an evicted record owns on the GPU side.
pub fn evict(record: ChunkRecord, uploader: &mut dyn MeshUploader) {
    if let Some(handle) = record.gpu_handle {
        uploader.release(handle);
    }
    log::debug!("Evicted chunk {} in state {:?}", record.key, record.state);
}
