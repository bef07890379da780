use delve_core::constants::{MAX_STREAM_RADIUS, MAX_VERTICAL_LAYERS};
use delve_core::types::ChunkKey;
use delve_core::VerticalExtent;
use glam::IVec3;

/// Decides which chunk keys stay resident around the camera.
///
/// Horizontally a square of `[-radius, radius]` chunks on X and Z around the
/// camera chunk; vertically whatever the configured [`VerticalExtent`] says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingPolicy {
    vertical: VerticalExtent,
}

impl Default for StreamingPolicy {
    fn default() -> Self {
        Self::new(VerticalExtent::default())
    }
}

impl StreamingPolicy {
    /// Extents wider than [`MAX_VERTICAL_LAYERS`] are clamped.
    pub fn new(vertical: VerticalExtent) -> Self {
        let clamped = vertical.clamped(MAX_VERTICAL_LAYERS);
        if clamped != vertical {
            log::warn!("Vertical extent {:?} clamped to {:?}", vertical, clamped);
        }
        Self { vertical: clamped }
    }

    /// Radii beyond [`MAX_STREAM_RADIUS`] are clamped.
    pub fn clamp_radius(radius: u32) -> u32 {
        if radius > MAX_STREAM_RADIUS {
            log::warn!("Streaming radius {} clamped to {}", radius, MAX_STREAM_RADIUS);
        }
        radius.min(MAX_STREAM_RADIUS)
    }

    /// Whether `key` belongs to the neighborhood of `center`.
    pub fn contains(&self, center: ChunkKey, radius: u32, key: ChunkKey) -> bool {
        let r = radius as i32;
        let (min_y, max_y) = self.vertical.layers(center.y);
        (key.x - center.x).abs() <= r
            && (key.z - center.z).abs() <= r
            && (min_y..=max_y).contains(&key.y)
    }

    /// Every key in the neighborhood, nearest to the camera column first.
    pub fn neighborhood(&self, center: ChunkKey, radius: u32) -> Vec<ChunkKey> {
        let r = radius as i32;
        let (min_y, max_y) = self.vertical.layers(center.y);
        let side = (2 * r + 1) as usize;
        let layers = (i64::from(max_y) - i64::from(min_y) + 1).max(0) as usize;

        let mut keys = Vec::with_capacity(side * side * layers);
        for dz in -r..=r {
            for dx in -r..=r {
                for y in min_y..=max_y {
                    keys.push(IVec3::new(center.x + dx, y, center.z + dz));
                }
            }
        }
        keys.sort_by_key(|k| priority(center, *k));
        keys
    }
}

/// Sort key: horizontal distance, then vertical distance, then position for
/// a stable order.
pub fn priority(center: ChunkKey, key: ChunkKey) -> (i32, i32, i32, i32, i32) {
    let d = key - center;
    (d.x * d.x + d.z * d.z, d.y.abs(), key.x, key.y, key.z)
}
