use thiserror::Error;

/// Errors raised by chunk lattice access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChunkError {
    #[error("local coordinate ({x}, {y}, {z}) outside chunk lattice [0, {size})")]
    OutOfBounds { x: i32, y: i32, z: i32, size: u32 },

    #[error("density buffer has {actual} samples, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings RON: {0}")]
    Parse(String),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
