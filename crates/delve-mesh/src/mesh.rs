use glam::Vec3;

/// Triangle mesh produced for one chunk.
///
/// Positions are chunk-local lattice units; add the chunk origin to place
/// the mesh in the world. `normals[i]` belongs to `positions[i]`, and every
/// three consecutive indices form one triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append one unshared triangle.
    pub fn push_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3]) {
        let base = self.positions.len() as u32;
        for (position, normal) in positions.iter().zip(normals.iter()) {
            self.positions.push(position.to_array());
            self.normals.push(normal.to_array());
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Indices narrowed to 16 bits, or None when the mesh has more vertices
    /// than a 16-bit index can address.
    pub fn indices_u16(&self) -> Option<Vec<u16>> {
        if self.vertex_count() > u16::MAX as usize + 1 {
            return None;
        }
        Some(self.indices.iter().map(|&i| i as u16).collect())
    }

    /// Axis-aligned bounds of all vertices, in the same space as `positions`.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}
