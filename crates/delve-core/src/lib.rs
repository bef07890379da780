pub mod chunk;
pub mod constants;
pub mod error;
pub mod math;
pub mod settings;
pub mod types;

pub use chunk::Chunk;
pub use error::{ChunkError, SettingsError};
pub use settings::{load_settings_from_str, Settings, StreamerConfig, TerrainParams, VerticalExtent};
pub use types::{ChunkKey, GpuMeshHandle, JobId};
