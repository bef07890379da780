//! Marching Cubes surface extraction over a density lattice.
//!
//! Density is negative inside solid and positive in air. Each of the
//! (N-1)^3 cells is classified by which corners lie below the iso-level,
//! vertices are placed on crossed edges by linear interpolation, and
//! normals come from central-difference gradients at the lattice points.

use glam::Vec3;

use delve_core::constants::CHUNK_SIZE;
use delve_core::math::flat_index;
use delve_core::Chunk;

use crate::mesh::Mesh;
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_END, TRI_TABLE};

/// Extract the iso-surface of a chunk. An unpopulated chunk reads as uniform
/// air and yields an empty mesh.
pub fn polygonize(chunk: &Chunk, iso_level: f32) -> Mesh {
    match chunk.samples() {
        Some(samples) => polygonize_lattice(samples, CHUNK_SIZE as usize, iso_level),
        None => Mesh::new(),
    }
}

/// Extract the iso-surface of an arbitrary cubic lattice with `edge` samples
/// per axis, laid out `x + y*edge + z*edge^2`.
///
/// A lattice whose length doesn't match `edge^3`, or with fewer than two
/// samples per axis, yields an empty mesh.
pub fn polygonize_lattice(samples: &[f32], edge: usize, iso_level: f32) -> Mesh {
    let mut mesh = Mesh::new();
    if edge < 2 || samples.len() != edge * edge * edge {
        log::warn!(
            "Skipping malformed lattice: {} samples for edge {}",
            samples.len(),
            edge
        );
        return mesh;
    }

    let lattice = Lattice { samples, edge };
    let cells = edge - 1;
    for z in 0..cells {
        for y in 0..cells {
            for x in 0..cells {
                lattice.polygonize_cell([x, y, z], iso_level, &mut mesh);
            }
        }
    }
    mesh
}

#[derive(Debug, Clone, Copy, Default)]
struct EdgeVertex {
    position: Vec3,
    normal: Vec3,
}

struct Lattice<'a> {
    samples: &'a [f32],
    edge: usize,
}

impl Lattice<'_> {
    #[inline]
    fn at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.samples[flat_index(x, y, z, self.edge)]
    }

    /// Central-difference gradient, one-sided at the lattice boundary.
    /// Points toward increasing density, i.e. from solid into air.
    fn gradient(&self, [x, y, z]: [usize; 3]) -> Vec3 {
        let last = self.edge - 1;
        Vec3::new(
            self.at((x + 1).min(last), y, z) - self.at(x.saturating_sub(1), y, z),
            self.at(x, (y + 1).min(last), z) - self.at(x, y.saturating_sub(1), z),
            self.at(x, y, (z + 1).min(last)) - self.at(x, y, z.saturating_sub(1)),
        )
    }

    fn polygonize_cell(&self, cell: [usize; 3], iso_level: f32, mesh: &mut Mesh) {
        let corners: [[usize; 3]; 8] = CORNER_OFFSETS
            .map(|[dx, dy, dz]| [cell[0] + dx, cell[1] + dy, cell[2] + dz]);

        let mut values = [0.0f32; 8];
        let mut case_index = 0usize;
        for (i, [x, y, z]) in corners.iter().copied().enumerate() {
            values[i] = self.at(x, y, z);
            if values[i] < iso_level {
                case_index |= 1 << i;
            }
        }

        let edge_mask = EDGE_TABLE[case_index];
        if edge_mask == 0 {
            return;
        }

        let mut vertices = [EdgeVertex::default(); 12];
        for (edge, [a, b]) in EDGE_CORNERS.iter().copied().enumerate() {
            if edge_mask & (1 << edge) == 0 {
                continue;
            }
            let t = crossing(values[a], values[b], iso_level);
            let pa = corner_position(corners[a]);
            let pb = corner_position(corners[b]);
            let na = self.gradient(corners[a]).normalize_or_zero();
            let nb = self.gradient(corners[b]).normalize_or_zero();
            vertices[edge] = EdgeVertex {
                position: pa.lerp(pb, t),
                normal: na.lerp(nb, t).normalize_or_zero(),
            };
        }

        for tri in TRI_TABLE[case_index]
            .chunks_exact(3)
            .take_while(|tri| tri[0] != TRI_END)
        {
            let [v0, v1, v2] = [tri[0], tri[1], tri[2]].map(|e| vertices[e as usize]);
            mesh.push_triangle(
                [v0.position, v1.position, v2.position],
                [v0.normal, v1.normal, v2.normal],
            );
        }
    }
}

fn corner_position([x, y, z]: [usize; 3]) -> Vec3 {
    Vec3::new(x as f32, y as f32, z as f32)
}

/// Fraction along an edge where density crosses the iso-level. Exactly 0 or 1
/// when an endpoint sits on the iso-level; 0.5 when both endpoints are equal.
fn crossing(a: f32, b: f32, iso_level: f32) -> f32 {
    if a == iso_level {
        return 0.0;
    }
    if b == iso_level {
        return 1.0;
    }
    let delta = b - a;
    if delta == 0.0 {
        return 0.5;
    }
    ((iso_level - a) / delta).clamp(0.0, 1.0)
}
