pub mod chunk_map;
pub mod dispatch;
pub mod error;
pub mod record;
pub mod state_machine;
pub mod streaming;
pub mod terrain;
pub mod upload;

#[cfg(test)]
mod test_support;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use chunk_map::{ChunkMap, StateCounts};
use delve_core::math::world_to_chunk;
use delve_core::types::{ChunkKey, GpuMeshHandle, JobId};
use delve_core::{Settings, StreamerConfig, TerrainParams};
use glam::{IVec3, Vec3};
use record::{ChunkRecord, ChunkState};
use state_machine::UploadOutcome;
use streaming::StreamingPolicy;

pub use dispatch::{DensitySource, InlineDispatcher, JobCompletion, JobDispatcher, PopulateJob, WorkerPool};
pub use error::StreamError;
pub use terrain::TerrainGenerator;
pub use upload::{MeshUploader, UploadError};

/// Snapshot of scheduler progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub states: StateCounts,
    /// Dispatched jobs not yet polled back.
    pub in_flight: usize,
    /// Keys waiting in the work queue.
    pub queued: usize,
    /// Uploads the uploader asked to retry, over the streamer's lifetime.
    pub deferred_uploads: u64,
    /// Tracked records whose upload failed fatally.
    pub failed_uploads: u32,
}

/// Primary public struct for the delve-world crate.
///
/// Tracks chunk records around a moving camera and advances each one through
/// `Empty -> Populating -> Meshed -> Uploading -> Uploaded`. Generation and
/// meshing run through the dispatcher; uploads go through the uploader and
/// are rate-limited per pass. Only the owning thread mutates records.
pub struct TerrainStreamer<D: JobDispatcher, U: MeshUploader> {
    params: Arc<TerrainParams>,
    config: StreamerConfig,
    policy: StreamingPolicy,
    chunk_map: ChunkMap,
    queue: VecDeque<ChunkKey>,
    dispatcher: D,
    uploader: U,
    next_job_id: u64,
    center: ChunkKey,
    deferred_uploads: u64,
}

impl<U: MeshUploader> TerrainStreamer<WorkerPool, U> {
    /// Streamer backed by a rayon worker pool running the noise generator.
    pub fn with_worker_pool(settings: &Settings, uploader: U) -> Result<Self, StreamError> {
        let params = Arc::new(settings.terrain.clone());
        let source: Arc<dyn DensitySource> = Arc::new(TerrainGenerator::new(Arc::clone(&params)));
        let pool = WorkerPool::new(source, settings.streaming.worker_threads)?;
        Ok(Self::new(params, settings.streaming.clone(), pool, uploader))
    }
}

impl<D: JobDispatcher, U: MeshUploader> TerrainStreamer<D, U> {
    pub fn new(params: Arc<TerrainParams>, config: StreamerConfig, dispatcher: D, uploader: U) -> Self {
        log::info!(
            "Terrain streamer: seed {}, {} octaves, vertical {:?}, {} uploads/pass",
            params.seed,
            params.octaves,
            config.vertical,
            config.uploads_per_pass
        );
        Self {
            params,
            policy: StreamingPolicy::new(config.vertical),
            config,
            chunk_map: ChunkMap::new(),
            queue: VecDeque::new(),
            dispatcher,
            uploader,
            next_job_id: 0,
            center: IVec3::ZERO,
            deferred_uploads: 0,
        }
    }

    /// Re-center the streaming neighborhood on `center`.
    ///
    /// New keys get `Empty` records and are enqueued; kept records are
    /// touched; records outside the neighborhood are evicted immediately and
    /// their GPU handles released. Calling again with the same input changes
    /// nothing.
    pub fn update_target(&mut self, center: Vec3, radius: u32, frame: u64) {
        let radius = StreamingPolicy::clamp_radius(radius);
        let center_key = world_to_chunk(center);
        self.center = center_key;

        let policy = self.policy;
        let evicted = self
            .chunk_map
            .drain_where_not(|key| policy.contains(center_key, radius, *key));
        let evicted_count = evicted.len();
        if !evicted.is_empty() {
            let gone: HashSet<ChunkKey> = evicted.iter().map(|r| r.key).collect();
            self.queue.retain(|key| !gone.contains(key));
            for record in evicted {
                state_machine::evict(record, &mut self.uploader);
            }
        }

        let mut created = 0usize;
        for key in policy.neighborhood(center_key, radius) {
            if self.chunk_map.track(key, frame) {
                ensure_enqueued(&mut self.chunk_map, &mut self.queue, key);
                created += 1;
            }
        }

        if created > 0 || evicted_count > 0 {
            log::debug!(
                "Target {} r={} frame {}: +{} -{} ({} tracked)",
                center_key,
                radius,
                frame,
                created,
                evicted_count,
                self.chunk_map.len()
            );
        }
    }

    /// Advance pending work until the queue empties or `deadline` passes.
    ///
    /// Completions are always applied first, then every non-terminal record
    /// is made sure to be queued. A fatal upload failure aborts the pass; the
    /// failed record is never offered again, while keys still queued behind it
    /// stay queued for the next pass.
    pub fn process_until(&mut self, deadline: Instant) -> Result<(), StreamError> {
        for completion in self.dispatcher.poll()? {
            if let Some(key) = state_machine::apply_completion(&mut self.chunk_map, completion) {
                ensure_enqueued(&mut self.chunk_map, &mut self.queue, key);
            }
        }

        let center = self.center;
        let mut pending: Vec<ChunkKey> = self
            .chunk_map
            .iter()
            .filter(|(_, record)| !record.is_terminal() && !record.queued)
            .map(|(key, _)| *key)
            .collect();
        pending.sort_by_key(|key| streaming::priority(center, *key));
        for key in pending {
            ensure_enqueued(&mut self.chunk_map, &mut self.queue, key);
        }

        let mut uploads_left = self.config.uploads_per_pass;
        while Instant::now() < deadline {
            let Some(key) = self.queue.pop_front() else {
                break;
            };
            let Some(record) = self.chunk_map.get_mut(&key) else {
                continue;
            };
            record.queued = false;

            match record.state {
                ChunkState::Empty => {
                    self.next_job_id += 1;
                    let job_id = JobId(self.next_job_id);
                    state_machine::begin_populate(record, job_id);
                    self.dispatcher.dispatch(PopulateJob {
                        key,
                        job_id,
                        params: Arc::clone(&self.params),
                        iso_level: self.config.iso_level,
                    });
                }
                ChunkState::Meshed if uploads_left > 0 && !record.upload_failed => {
                    uploads_left -= 1;
                    if state_machine::upload_mesh(record, &mut self.uploader)?
                        == UploadOutcome::Deferred
                    {
                        self.deferred_uploads += 1;
                    }
                }
                // Waiting on a job, out of upload slots, or done.
                _ => {}
            }
        }
        Ok(())
    }

    /// Chunks whose meshes are resident, with their handles.
    pub fn render_ready_chunks(&self) -> impl Iterator<Item = (ChunkKey, GpuMeshHandle)> + '_ {
        self.chunk_map
            .iter()
            .filter(|(_, record)| record.is_render_ready())
            .filter_map(|(key, record)| record.gpu_handle.map(|handle| (*key, handle)))
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            states: self.chunk_map.state_counts(),
            in_flight: self.dispatcher.in_flight(),
            queued: self.queue.len(),
            deferred_uploads: self.deferred_uploads,
            failed_uploads: self.chunk_map.iter().filter(|(_, r)| r.upload_failed).count() as u32,
        }
    }

    pub fn record(&self, key: ChunkKey) -> Option<&ChunkRecord> {
        self.chunk_map.get(&key)
    }

    pub fn len(&self) -> usize {
        self.chunk_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_map.is_empty()
    }

    pub fn params(&self) -> &Arc<TerrainParams> {
        &self.params
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Chunk key of the last target center.
    pub fn center(&self) -> ChunkKey {
        self.center
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn uploader_mut(&mut self) -> &mut U {
        &mut self.uploader
    }

    /// Evict every record and release all GPU handles.
    pub fn release_all(&mut self) {
        let records = self.chunk_map.drain_all();
        if !records.is_empty() {
            log::debug!("Releasing {} chunk records", records.len());
        }
        self.queue.clear();
        for record in records {
            state_machine::evict(record, &mut self.uploader);
        }
    }
}

impl<D: JobDispatcher, U: MeshUploader> Drop for TerrainStreamer<D, U> {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn ensure_enqueued(chunk_map: &mut ChunkMap, queue: &mut VecDeque<ChunkKey>, key: ChunkKey) {
    if let Some(record) = chunk_map.get_mut(&key) {
        if !record.queued {
            record.queued = true;
            queue.push_back(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::constants::MAX_VERTICAL_LAYERS;
    use delve_core::VerticalExtent;
    use std::time::Duration;
    use crate::test_support::{generator, HeldDispatcher, RecordingUploader};

    type InlineStreamer = TerrainStreamer<InlineDispatcher, RecordingUploader>;

    fn far_future() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn inline_streamer(config: StreamerConfig) -> InlineStreamer {
        TerrainStreamer::new(
            Arc::new(TerrainParams::default()),
            config,
            InlineDispatcher::new(generator()),
            RecordingUploader::default(),
        )
    }

    fn held_streamer() -> TerrainStreamer<HeldDispatcher, RecordingUploader> {
        TerrainStreamer::new(
            Arc::new(TerrainParams::default()),
            StreamerConfig::default(),
            HeldDispatcher::new(),
            RecordingUploader::default(),
        )
    }

    fn snapshot<D: JobDispatcher, U: MeshUploader>(
        streamer: &TerrainStreamer<D, U>,
    ) -> Vec<(ChunkKey, ChunkState, u64, bool)> {
        let mut rows: Vec<_> = streamer
            .chunk_map
            .iter()
            .map(|(k, r)| (*k, r.state, r.last_touched_frame, r.queued))
            .collect();
        rows.sort_by_key(|(k, ..)| (k.x, k.y, k.z));
        rows
    }

    #[test]
    fn test_update_target_tracks_neighborhood() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::new(20.0, 40.0, -3.0), 1, 0);
        assert_eq!(streamer.center(), IVec3::new(1, 2, -1));
        assert_eq!(streamer.len(), 9);
        let stats = streamer.stats();
        assert_eq!(stats.states.empty, 9);
        assert_eq!(stats.queued, 9);
        assert!(streamer.record(IVec3::new(2, 0, 0)).is_some());
        assert!(streamer.record(IVec3::new(1, 2, -1)).is_none(), "default is layer 0 only");
    }

    #[test]
    fn test_update_target_idempotent() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::new(5.0, 0.0, 5.0), 2, 7);
        let before = snapshot(&streamer);
        let queued_before = streamer.stats().queued;

        streamer.update_target(Vec3::new(5.0, 0.0, 5.0), 2, 7);
        assert_eq!(snapshot(&streamer), before);
        assert_eq!(streamer.stats().queued, queued_before);
    }

    #[test]
    fn test_inline_pipeline_reaches_uploaded() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::new(8.0, 8.0, 8.0), 1, 0);
        for _ in 0..12 {
            streamer.process_until(far_future()).expect("no fatal upload");
        }
        let stats = streamer.stats();
        assert_eq!(stats.states.uploaded, 9);
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.queued, 0);
        assert_eq!(streamer.render_ready_chunks().count(), 9);

        let origin = streamer.record(IVec3::ZERO).expect("tracked");
        assert!(origin.chunk.is_allocated());
        assert!(!origin.mesh.as_ref().expect("meshed").is_empty());
    }

    #[test]
    fn test_one_upload_slot_per_pass() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::ZERO, 1, 0);

        streamer.process_until(far_future()).expect("pass 1");
        assert_eq!(streamer.stats().states.populating, 9);
        assert_eq!(streamer.stats().states.uploaded, 0);

        streamer.process_until(far_future()).expect("pass 2");
        assert_eq!(streamer.stats().states.uploaded, 1);
        assert_eq!(streamer.stats().states.meshed, 8);

        streamer.process_until(far_future()).expect("pass 3");
        assert_eq!(streamer.stats().states.uploaded, 2);
    }

    #[test]
    fn test_configured_upload_slots() {
        let config = StreamerConfig {
            uploads_per_pass: 4,
            ..StreamerConfig::default()
        };
        let mut streamer = inline_streamer(config);
        streamer.update_target(Vec3::ZERO, 1, 0);
        streamer.process_until(far_future()).expect("pass 1");
        streamer.process_until(far_future()).expect("pass 2");
        assert_eq!(streamer.stats().states.uploaded, 4);
    }

    #[test]
    fn test_nearest_chunk_uploads_first() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::new(40.0, 0.0, 40.0), 2, 0);
        streamer.process_until(far_future()).expect("pass 1");
        streamer.process_until(far_future()).expect("pass 2");
        assert_eq!(streamer.uploader().uploaded, vec![IVec3::new(2, 0, 2)]);
    }

    #[test]
    fn test_expired_deadline_only_applies_completions() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::ZERO, 1, 0);
        streamer.process_until(far_future()).expect("pass 1");

        streamer.process_until(Instant::now()).expect("expired pass");
        let stats = streamer.stats();
        assert_eq!(stats.states.meshed, 9, "completions applied regardless of deadline");
        assert_eq!(stats.states.uploaded, 0);
        assert_eq!(stats.queued, 9);

        // Nothing was lost from the queue.
        streamer.process_until(far_future()).expect("pass 3");
        assert_eq!(streamer.stats().states.uploaded, 1);
    }

    #[test]
    fn test_expired_deadline_dispatches_nothing() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::ZERO, 0, 0);
        streamer.process_until(Instant::now()).expect("expired pass");
        assert_eq!(streamer.stats().states.empty, 1);
        assert_eq!(streamer.stats().in_flight, 0);
    }

    #[test]
    fn test_evict_then_readd_restarts_empty() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.update_target(Vec3::ZERO, 0, 0);
        for _ in 0..3 {
            streamer.process_until(far_future()).expect("no fatal upload");
        }
        let record = streamer.record(IVec3::ZERO).expect("tracked");
        assert_eq!(record.state, ChunkState::Uploaded);
        let handle = record.gpu_handle.expect("uploaded");

        streamer.update_target(Vec3::new(1000.0, 0.0, 0.0), 0, 1);
        assert!(streamer.record(IVec3::ZERO).is_none());
        assert_eq!(streamer.uploader().released, vec![handle]);
        assert!(streamer.uploader().live.is_empty());

        streamer.update_target(Vec3::ZERO, 0, 2);
        let record = streamer.record(IVec3::ZERO).expect("tracked again");
        assert_eq!(record.state, ChunkState::Empty);
        assert!(record.mesh.is_none());
        assert!(record.gpu_handle.is_none());
        assert!(record.job_id.is_none());
        assert!(!record.chunk.is_allocated());
        assert_eq!(record.last_touched_frame, 2);
    }

    #[test]
    fn test_stale_completion_after_readd_discarded() {
        let mut streamer = held_streamer();
        streamer.update_target(Vec3::ZERO, 0, 0);
        streamer.process_until(far_future()).expect("dispatch job 1");
        assert_eq!(streamer.record(IVec3::ZERO).expect("tracked").job_id, Some(JobId(1)));

        streamer.update_target(Vec3::new(0.0, 0.0, 500.0), 0, 1);
        streamer.update_target(Vec3::ZERO, 0, 2);
        streamer.process_until(far_future()).expect("dispatch job 2");
        assert_eq!(streamer.record(IVec3::ZERO).expect("tracked").job_id, Some(JobId(2)));

        assert!(streamer.dispatcher_mut().complete(JobId(1)));
        streamer.process_until(far_future()).expect("stale pass");
        let record = streamer.record(IVec3::ZERO).expect("tracked");
        assert_eq!(record.state, ChunkState::Populating);
        assert!(record.mesh.is_none());

        assert!(streamer.dispatcher_mut().complete(JobId(2)));
        streamer.process_until(far_future()).expect("current pass");
        let record = streamer.record(IVec3::ZERO).expect("tracked");
        assert_eq!(record.state, ChunkState::Uploaded);
        assert_eq!(streamer.uploader().uploaded, vec![IVec3::ZERO]);
    }

    #[test]
    fn test_completion_for_evicted_key_ignored() {
        let mut streamer = held_streamer();
        streamer.update_target(Vec3::ZERO, 0, 0);
        streamer.process_until(far_future()).expect("dispatch");
        streamer.update_target(Vec3::new(-300.0, 0.0, 0.0), 0, 1);
        streamer.dispatcher_mut().complete_all();
        streamer.process_until(far_future()).expect("pass");
        assert!(streamer.record(IVec3::ZERO).is_none());
        assert!(streamer.uploader().uploaded.is_empty());
    }

    #[test]
    fn test_retryable_upload_tries_again() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.uploader_mut().retries_left = 2;
        streamer.update_target(Vec3::ZERO, 0, 0);
        streamer.process_until(far_future()).expect("dispatch");
        streamer.process_until(far_future()).expect("retry 1");
        assert_eq!(streamer.record(IVec3::ZERO).expect("tracked").state, ChunkState::Meshed);
        streamer.process_until(far_future()).expect("retry 2");
        assert_eq!(streamer.record(IVec3::ZERO).expect("tracked").state, ChunkState::Meshed);
        streamer.process_until(far_future()).expect("success");
        assert_eq!(streamer.record(IVec3::ZERO).expect("tracked").state, ChunkState::Uploaded);
    }

    #[test]
    fn test_fatal_upload_surfaces_once() {
        let key = IVec3::new(-1, 0, -1);
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.uploader_mut().fatal = true;
        streamer.update_target(Vec3::new(-1.0, 0.0, -1.0), 0, 0);
        streamer.process_until(far_future()).expect("dispatch");

        match streamer.process_until(far_future()) {
            Err(StreamError::Upload { key: failed, .. }) => assert_eq!(failed, key),
            other => panic!("expected fatal upload error, got {other:?}"),
        }
        for _ in 0..5 {
            streamer.process_until(far_future()).expect("failed mesh not offered again");
        }
        assert_eq!(streamer.uploader().attempts, vec![key], "exactly one upload attempt");
        let record = streamer.record(key).expect("tracked");
        assert_eq!(record.state, ChunkState::Meshed);
        assert!(record.upload_failed);
        assert_eq!(streamer.stats().failed_uploads, 1);
        assert_eq!(streamer.stats().queued, 0);
        assert_eq!(streamer.render_ready_chunks().count(), 0);

        // Evicting and tracking the key again starts it over.
        streamer.uploader_mut().fatal = false;
        streamer.update_target(Vec3::new(5000.0, 0.0, 0.0), 0, 1);
        streamer.update_target(Vec3::new(-1.0, 0.0, -1.0), 0, 2);
        for _ in 0..3 {
            streamer.process_until(far_future()).expect("no fatal upload");
        }
        assert_eq!(streamer.stats().failed_uploads, 0);
        assert_eq!(streamer.record(key).expect("tracked").state, ChunkState::Uploaded);
    }

    #[test]
    fn test_fatal_upload_keeps_rest_of_queue() {
        let config = StreamerConfig {
            uploads_per_pass: 9,
            ..StreamerConfig::default()
        };
        let mut streamer = inline_streamer(config);
        // Third in priority order behind (0,0,0) and (-1,0,0).
        let bad = IVec3::new(0, 0, -1);
        streamer.uploader_mut().fatal_keys.insert(bad);
        streamer.update_target(Vec3::new(8.0, 0.0, 8.0), 1, 0);
        streamer.process_until(far_future()).expect("dispatch");

        assert!(matches!(
            streamer.process_until(far_future()),
            Err(StreamError::Upload { key, .. }) if key == bad
        ));
        let stats = streamer.stats();
        assert_eq!(stats.states.uploaded, 2);
        assert_eq!(stats.queued, 6, "keys behind the failure stay queued");

        streamer.process_until(far_future()).expect("rest uploads");
        let stats = streamer.stats();
        assert_eq!(stats.states.uploaded, 8);
        assert_eq!(stats.failed_uploads, 1);
        assert_eq!(streamer.render_ready_chunks().count(), 8);
        let bad_attempts = streamer.uploader().attempts.iter().filter(|k| **k == bad).count();
        assert_eq!(bad_attempts, 1);
    }

    #[test]
    fn test_deferred_upload_spends_slot() {
        let mut streamer = inline_streamer(StreamerConfig::default());
        streamer.uploader_mut().retries_left = 1;
        streamer.update_target(Vec3::ZERO, 1, 0);
        streamer.process_until(far_future()).expect("dispatch");

        streamer.process_until(far_future()).expect("deferred pass");
        let stats = streamer.stats();
        assert_eq!(stats.states.uploaded, 0, "the retry used the only slot");
        assert_eq!(stats.states.meshed, 9);
        assert_eq!(stats.deferred_uploads, 1);
        assert_eq!(streamer.uploader().attempts.len(), 1);

        streamer.process_until(far_future()).expect("next pass");
        assert_eq!(streamer.stats().states.uploaded, 1);
        assert_eq!(streamer.uploader().attempts.len(), 2);
    }

    #[test]
    fn test_vertical_extent_around_camera() {
        let config = StreamerConfig {
            vertical: VerticalExtent::Around { below: 1, above: 0 },
            ..StreamerConfig::default()
        };
        let mut streamer = inline_streamer(config);
        streamer.update_target(Vec3::new(0.0, 35.0, 0.0), 1, 0);
        assert_eq!(streamer.len(), 18);
        assert!(streamer.record(IVec3::new(0, 1, 0)).is_some());
        assert!(streamer.record(IVec3::new(0, 2, 0)).is_some());
        assert!(streamer.record(IVec3::new(0, 0, 0)).is_none());
    }

    #[test]
    fn test_oversized_vertical_extent_is_bounded() {
        let config = StreamerConfig {
            vertical: VerticalExtent::Layers {
                min: -2_000_000_000,
                max: 2_000_000_000,
            },
            ..StreamerConfig::default()
        };
        let mut streamer = inline_streamer(config);
        streamer.update_target(Vec3::ZERO, 0, 0);
        assert_eq!(streamer.len(), MAX_VERTICAL_LAYERS as usize);
    }

    #[test]
    fn test_release_all_frees_every_handle() {
        let config = StreamerConfig {
            uploads_per_pass: 9,
            ..StreamerConfig::default()
        };
        let mut streamer = inline_streamer(config);
        streamer.update_target(Vec3::ZERO, 1, 0);
        streamer.process_until(far_future()).expect("pass 1");
        streamer.process_until(far_future()).expect("pass 2");
        assert_eq!(streamer.uploader().live.len(), 9);

        streamer.release_all();
        assert!(streamer.is_empty());
        assert!(streamer.uploader().live.is_empty());
        assert_eq!(streamer.uploader().released.len(), 9);
        assert_eq!(streamer.stats().queued, 0);
    }

    #[test]
    fn test_worker_pool_pipeline_reaches_uploaded() {
        let mut settings = Settings::default();
        settings.streaming.worker_threads = 2;
        settings.streaming.uploads_per_pass = 3;
        let mut streamer = TerrainStreamer::with_worker_pool(&settings, RecordingUploader::default())
            .expect("pool builds");
        streamer.update_target(Vec3::new(8.0, 8.0, 8.0), 1, 0);

        let give_up = Instant::now() + Duration::from_secs(20);
        while streamer.stats().states.uploaded < 9 && Instant::now() < give_up {
            streamer
                .process_until(Instant::now() + Duration::from_millis(5))
                .expect("no fatal upload");
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(streamer.stats().states.uploaded, 9);
        let origin = streamer.record(IVec3::ZERO).expect("tracked");
        assert!(!origin.mesh.as_ref().expect("meshed").is_empty());
    }
}
