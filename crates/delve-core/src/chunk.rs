use crate::constants::{CHUNK_SIZE, EMPTY_DENSITY, SAMPLES_PER_CHUNK};
use crate::error::ChunkError;
use crate::math::{flat_index, in_chunk_bounds};
use crate::types::ChunkKey;

/// Dense cubic lattice of density samples for one chunk.
///
/// Storage is allocated lazily. Until the first `set` (or construction from
/// a generated buffer) every sample reads as [`EMPTY_DENSITY`], i.e. air.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    key: ChunkKey,
    samples: Option<Box<[f32]>>,
}

impl Chunk {
    /// Create an empty chunk with no backing storage.
    pub fn new(key: ChunkKey) -> Self {
        Self { key, samples: None }
    }

    /// Wrap a generated density buffer. The buffer must hold exactly
    /// CHUNK_SIZE^3 samples in `x + y*N + z*N^2` order.
    pub fn from_samples(key: ChunkKey, samples: Vec<f32>) -> Result<Self, ChunkError> {
        if samples.len() != SAMPLES_PER_CHUNK as usize {
            return Err(ChunkError::BufferSize {
                expected: SAMPLES_PER_CHUNK as usize,
                actual: samples.len(),
            });
        }
        Ok(Self {
            key,
            samples: Some(samples.into_boxed_slice()),
        })
    }

    /// Chunk-space key of this lattice.
    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// Whether backing storage exists.
    pub fn is_allocated(&self) -> bool {
        self.samples.is_some()
    }

    /// Raw samples in flat order, or None for an unpopulated chunk.
    pub fn samples(&self) -> Option<&[f32]> {
        self.samples.as_deref()
    }

    /// Read the density at a local coordinate.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<f32, ChunkError> {
        let idx = Self::index(x, y, z)?;
        Ok(self
            .samples
            .as_ref()
            .map_or(EMPTY_DENSITY, |samples| samples[idx]))
    }

    /// Write the density at a local coordinate, allocating on first use.
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: f32) -> Result<(), ChunkError> {
        let idx = Self::index(x, y, z)?;
        let samples = self.samples.get_or_insert_with(|| {
            vec![EMPTY_DENSITY; SAMPLES_PER_CHUNK as usize].into_boxed_slice()
        });
        samples[idx] = value;
        Ok(())
    }

    /// Replace the whole lattice with a generated buffer.
    pub fn replace_samples(&mut self, samples: Vec<f32>) -> Result<(), ChunkError> {
        *self = Self::from_samples(self.key, samples)?;
        Ok(())
    }

    /// Drop backing storage, returning the chunk to its empty representation.
    pub fn clear(&mut self) {
        self.samples = None;
    }

    fn index(x: i32, y: i32, z: i32) -> Result<usize, ChunkError> {
        if !in_chunk_bounds(x, y, z) {
            return Err(ChunkError::OutOfBounds {
                x,
                y,
                z,
                size: CHUNK_SIZE,
            });
        }
        Ok(flat_index(
            x as usize,
            y as usize,
            z as usize,
            CHUNK_SIZE as usize,
        ))
    }
}
