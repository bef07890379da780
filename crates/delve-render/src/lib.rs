//! Host-side rendering support: frustum culling of streamed chunks and a
//! CPU mesh arena that owns uploaded chunk meshes.

pub mod arena;
pub mod camera;
pub mod frustum;
pub mod visibility;

pub use arena::{ArenaStats, IndexBuffer, MeshArena, MeshVertex, ResidentMesh};
pub use camera::FlyCamera;
pub use frustum::{frustum_test, Frustum, Plane};
pub use visibility::{sort_front_to_back, visible_chunks};
