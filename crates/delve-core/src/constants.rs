//! Single source of truth for shared constants.
//! The chunk edge is fixed for the lifetime of the process; every lattice,
//! key conversion and mesh bound derives from it.

/// Side length of a chunk in density samples.
pub const CHUNK_SIZE: u32 = 16;

/// Total density samples per chunk (16^3).
pub const SAMPLES_PER_CHUNK: u32 = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Density value the renderable surface sits on.
pub const DEFAULT_ISO_LEVEL: f32 = 0.0;

/// Density reported for lattice points of a chunk that has no storage yet.
/// Non-negative, so an unpopulated chunk reads as open air.
pub const EMPTY_DENSITY: f32 = 0.0;

/// Mesh uploads performed per scheduling pass unless configured otherwise.
pub const DEFAULT_UPLOADS_PER_PASS: u32 = 1;

/// Horizontal streaming radius in chunks unless configured otherwise.
pub const DEFAULT_STREAM_RADIUS: u32 = 4;

/// Largest horizontal radius accepted by settings validation.
/// (2 * 64 + 1)^2 keeps a single layer under 17K records.
pub const MAX_STREAM_RADIUS: u32 = 64;

/// Most chunk layers a vertical extent may keep resident.
pub const MAX_VERTICAL_LAYERS: u32 = 16;

/// Seed offset applied per FBM octave so layers are decorrelated.
pub const OCTAVE_SEED_STRIDE: u32 = 1013;
