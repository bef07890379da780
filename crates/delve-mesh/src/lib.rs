//! Iso-surface extraction for density chunks.

pub mod mesh;
pub mod polygonize;
pub mod tables;

pub use mesh::Mesh;
pub use polygonize::{polygonize, polygonize_lattice};
