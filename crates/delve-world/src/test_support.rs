use std::collections::HashSet;
use std::sync::Arc;

use delve_core::types::{ChunkKey, GpuMeshHandle, JobId};
use delve_core::TerrainParams;
use delve_mesh::Mesh;

use crate::dispatch::{run_job, DensitySource, JobCompletion, JobDispatcher, PopulateJob};
use crate::error::StreamError;
use crate::terrain::TerrainGenerator;
use crate::upload::{MeshUploader, UploadError};

pub fn generator() -> Arc<dyn DensitySource> {
    Arc::new(TerrainGenerator::new(Arc::new(TerrainParams::default())))
}

/// Uploader that hands out sequential handles and remembers what it saw.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    pub next: u64,
    pub live: HashSet<GpuMeshHandle>,
    pub released: Vec<GpuMeshHandle>,
    pub uploaded: Vec<ChunkKey>,
    /// Every key offered to `upload`, in call order.
    pub attempts: Vec<ChunkKey>,
    /// Fail with `Retry` this many times before succeeding.
    pub retries_left: u32,
    pub fatal: bool,
    /// Keys rejected fatally even when `fatal` is off.
    pub fatal_keys: HashSet<ChunkKey>,
}

impl MeshUploader for RecordingUploader {
    fn upload(&mut self, key: ChunkKey, _mesh: &Mesh) -> Result<GpuMeshHandle, UploadError> {
        self.attempts.push(key);
        if self.fatal || self.fatal_keys.contains(&key) {
            return Err(UploadError::Fatal("device lost".into()));
        }
        if self.retries_left > 0 {
            self.retries_left -= 1;
            return Err(UploadError::Retry("staging buffer full".into()));
        }
        self.next += 1;
        let handle = GpuMeshHandle(self.next);
        self.live.insert(handle);
        self.uploaded.push(key);
        Ok(handle)
    }

    fn release(&mut self, handle: GpuMeshHandle) {
        self.live.remove(&handle);
        self.released.push(handle);
    }
}

/// Dispatcher that parks jobs until the test completes them explicitly.
pub struct HeldDispatcher {
    source: Arc<dyn DensitySource>,
    pub pending: Vec<PopulateJob>,
    ready: Vec<JobCompletion>,
}

impl HeldDispatcher {
    pub fn new() -> Self {
        Self {
            source: generator(),
            pending: Vec::new(),
            ready: Vec::new(),
        }
    }

    /// Finish one parked job. Returns false if no such job is parked.
    pub fn complete(&mut self, job_id: JobId) -> bool {
        match self.pending.iter().position(|job| job.job_id == job_id) {
            Some(i) => {
                let job = self.pending.remove(i);
                self.ready.push(run_job(self.source.as_ref(), job));
                true
            }
            None => false,
        }
    }

    pub fn complete_all(&mut self) {
        for job in std::mem::take(&mut self.pending) {
            self.ready.push(run_job(self.source.as_ref(), job));
        }
    }
}

impl JobDispatcher for HeldDispatcher {
    fn dispatch(&mut self, job: PopulateJob) {
        self.pending.push(job);
    }

    fn poll(&mut self) -> Result<Vec<JobCompletion>, StreamError> {
        Ok(std::mem::take(&mut self.ready))
    }

    fn in_flight(&self) -> usize {
        self.pending.len() + self.ready.len()
    }
}
