use std::time::{Duration, Instant};

use delve_core::Settings;
use delve_render::{sort_front_to_back, visible_chunks, FlyCamera, Frustum, MeshArena};
use delve_world::{StreamError, TerrainStreamer};
use glam::Vec3;

use crate::scenes::SceneConfig;

/// Aspect ratio of the virtual viewport used for culling.
const VIEW_ASPECT: f32 = 16.0 / 9.0;

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single flight.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub frame_count: u32,
    pub radius: u32,
    pub budget_ms: f64,
    /// Chunks tracked after the last frame.
    pub tracked_chunks: u32,
    /// Chunks render-ready after the last frame.
    pub uploaded_chunks: u32,
    /// First frame after which every tracked chunk was render-ready.
    pub frames_to_full: Option<u32>,
    pub mean_visible: f64,
    pub peak_visible: u32,
    /// Triangles in the visible set on the last frame.
    pub visible_triangles: u64,
    pub peak_arena_bytes: u64,
    pub timings: TimingSeries,
}

/// Drives a worker-pool streamer along scripted camera flights.
pub struct BenchmarkRunner {
    settings: Settings,
    frame_count: u32,
    radius: u32,
    budget: Duration,
    frame_period: Duration,
}

impl BenchmarkRunner {
    /// Frames are paced to `budget` unless [`Self::with_frame_period`] says otherwise.
    pub fn new(settings: Settings, frame_count: u32, radius: u32, budget: Duration) -> Self {
        Self {
            settings,
            frame_count,
            radius,
            budget,
            frame_period: budget,
        }
    }

    /// Minimum wall time per simulated frame, so workers get time to finish
    /// jobs the way they would between real frames.
    pub fn with_frame_period(mut self, frame_period: Duration) -> Self {
        self.frame_period = frame_period;
        self
    }

    /// Fly one scene and return its timings. A fatal upload error ends the run.
    pub fn run_scene(&self, config: &SceneConfig) -> Result<BenchmarkResult, StreamError> {
        log::info!(
            "Running scene '{}' (speed {}, radius {}, {} frames)...",
            config.name,
            config.speed,
            self.radius,
            self.frame_count
        );

        let mut streamer = TerrainStreamer::with_worker_pool(&self.settings, MeshArena::new())?;
        let mut camera = FlyCamera::new(config.start);
        camera.yaw = -std::f32::consts::FRAC_PI_2;
        camera.pitch = config.pitch;

        let mut frame_times = Vec::with_capacity(self.frame_count as usize);
        let mut frames_to_full = None;
        let mut visible_sum = 0u64;
        let mut peak_visible = 0u32;
        let mut peak_arena_bytes = 0u64;
        let mut visible_triangles = 0u64;

        for frame in 0..self.frame_count {
            let frame_start = Instant::now();

            streamer.update_target(camera.position, self.radius, u64::from(frame));
            streamer.process_until(frame_start + self.budget)?;

            let frustum = Frustum::from_view_projection(camera.view_proj(VIEW_ASPECT));
            let mut visible = visible_chunks(streamer.render_ready_chunks(), &frustum);
            sort_front_to_back(&mut visible, camera.position);

            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);

            visible_triangles = visible
                .iter()
                .filter_map(|(_, handle)| streamer.uploader().get(*handle))
                .map(|mesh| mesh.triangle_count() as u64)
                .sum();
            visible_sum += visible.len() as u64;
            peak_visible = peak_visible.max(visible.len() as u32);
            peak_arena_bytes = peak_arena_bytes.max(streamer.uploader().stats().used_bytes as u64);

            let stats = streamer.stats();
            if frames_to_full.is_none() && stats.states.uploaded as usize == streamer.len() {
                frames_to_full = Some(frame + 1);
                log::debug!("  All {} chunks resident after frame {}", streamer.len(), frame + 1);
            }

            camera.translate(Vec3::X * config.speed);

            let spent = frame_start.elapsed();
            if spent < self.frame_period {
                std::thread::sleep(self.frame_period - spent);
            }
        }

        let stats = streamer.stats();
        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.2}ms, p95={:.2}ms, {}/{} chunks resident",
            timings.mean_ms,
            timings.p95_ms,
            stats.states.uploaded,
            stats.states.total()
        );

        Ok(BenchmarkResult {
            scene_name: config.name.clone(),
            frame_count: self.frame_count,
            radius: self.radius,
            budget_ms: self.budget.as_secs_f64() * 1000.0,
            tracked_chunks: stats.states.total(),
            uploaded_chunks: stats.states.uploaded,
            frames_to_full,
            mean_visible: if self.frame_count == 0 {
                0.0
            } else {
                visible_sum as f64 / f64::from(self.frame_count)
            },
            peak_visible,
            visible_triangles,
            peak_arena_bytes,
            timings,
        })
    }
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
