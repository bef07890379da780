//! Off-thread density generation and meshing.
//!
//! A [`PopulateJob`] carries everything a worker needs: an immutable
//! parameter snapshot, the chunk key, and the job id stamped at dispatch.
//! Workers never touch scheduler state; their owned results come back as
//! [`JobCompletion`]s the control thread polls without blocking.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use delve_core::constants::CHUNK_SIZE;
use delve_core::types::{ChunkKey, JobId};
use delve_core::TerrainParams;
use delve_mesh::{polygonize_lattice, Mesh};

use crate::error::StreamError;

/// Produces a chunk's density lattice. Implementations must be pure: equal
/// inputs give bit-identical output.
pub trait DensitySource: Send + Sync {
    /// Return CHUNK_SIZE^3 samples in flat `x + y*N + z*N^2` order.
    fn compute_densities(&self, params: &TerrainParams, key: ChunkKey) -> Vec<f32>;
}

/// Work order for one chunk.
#[derive(Debug, Clone)]
pub struct PopulateJob {
    pub key: ChunkKey,
    pub job_id: JobId,
    pub params: Arc<TerrainParams>,
    pub iso_level: f32,
}

/// Owned result of a finished [`PopulateJob`].
#[derive(Debug, Clone)]
pub struct JobCompletion {
    pub key: ChunkKey,
    pub job_id: JobId,
    pub densities: Vec<f32>,
    pub mesh: Mesh,
}

/// Runs populate jobs somewhere and hands back their results.
pub trait JobDispatcher {
    /// Start a job. Never blocks on the job's work.
    fn dispatch(&mut self, job: PopulateJob);

    /// Collect every completion available right now, in completion order.
    fn poll(&mut self) -> Result<Vec<JobCompletion>, StreamError>;

    /// Jobs dispatched whose completion hasn't been polled yet.
    fn in_flight(&self) -> usize;
}

/// Generate densities then polygonize them, back to back.
pub fn run_job(source: &dyn DensitySource, job: PopulateJob) -> JobCompletion {
    let densities = source.compute_densities(&job.params, job.key);
    let mesh = polygonize_lattice(&densities, CHUNK_SIZE as usize, job.iso_level);
    JobCompletion {
        key: job.key,
        job_id: job.job_id,
        densities,
        mesh,
    }
}

/// Thread-pool dispatcher. Jobs run on a dedicated rayon pool and report
/// back over an unbounded channel.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    source: Arc<dyn DensitySource>,
    sender: Sender<JobCompletion>,
    receiver: Receiver<JobCompletion>,
    in_flight: usize,
}

impl WorkerPool {
    /// Build a pool with `threads` workers (0 = one per logical core).
    pub fn new(source: Arc<dyn DensitySource>, threads: usize) -> Result<Self, StreamError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("delve-worker-{i}"))
            .build()?;
        let (sender, receiver) = crossbeam_channel::unbounded();
        log::info!("Worker pool started with {} threads", pool.current_num_threads());
        Ok(Self {
            pool,
            source,
            sender,
            receiver,
            in_flight: 0,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl JobDispatcher for WorkerPool {
    fn dispatch(&mut self, job: PopulateJob) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        self.in_flight += 1;
        self.pool.spawn(move || {
            let completion = run_job(source.as_ref(), job);
            // Receiver gone means the pool was dropped; nothing left to notify.
            let _ = sender.send(completion);
        });
    }

    fn poll(&mut self) -> Result<Vec<JobCompletion>, StreamError> {
        let mut completions = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(completion) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    completions.push(completion);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(StreamError::DispatcherDisconnected),
            }
        }
        Ok(completions)
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Runs each job on the calling thread at dispatch time. Results are held
/// until the next poll, so the scheduler still sees them asynchronously.
pub struct InlineDispatcher {
    source: Arc<dyn DensitySource>,
    ready: Vec<JobCompletion>,
}

impl InlineDispatcher {
    pub fn new(source: Arc<dyn DensitySource>) -> Self {
        Self {
            source,
            ready: Vec::new(),
        }
    }
}

impl JobDispatcher for InlineDispatcher {
    fn dispatch(&mut self, job: PopulateJob) {
        let completion = run_job(self.source.as_ref(), job);
        self.ready.push(completion);
    }

    fn poll(&mut self) -> Result<Vec<JobCompletion>, StreamError> {
        Ok(std::mem::take(&mut self.ready))
    }

    fn in_flight(&self) -> usize {
        self.ready.len()
    }
}
