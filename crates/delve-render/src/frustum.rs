use glam::{Mat4, Vec3, Vec4};

/// Half-space boundary: points with `normal . p + offset >= 0` are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32) -> Self {
        Self { normal, offset }
    }

    /// Plane from a clip-space row combination, scaled to a unit normal.
    /// A degenerate row keeps its zero normal.
    fn from_row(row: Vec4) -> Self {
        let normal = row.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self::new(normal / len, row.w / len)
        } else {
            Self::new(normal, row.w)
        }
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.offset
    }
}

/// Six clip planes in the order left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Gribb/Hartmann extraction from a combined view-projection matrix with
    /// zero-to-one clip depth (as built by `Mat4::perspective_rh`).
    pub fn from_view_projection(view_proj: Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    pub fn test_aabb(&self, min: Vec3, max: Vec3) -> bool {
        frustum_test(&self.planes, min, max)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }
}

/// Conservative box test. A box is rejected only when its positive vertex
/// (the corner furthest along a plane's normal) lies outside some plane, so
/// partially visible boxes always pass.
pub fn frustum_test(planes: &[Plane], min: Vec3, max: Vec3) -> bool {
    planes.iter().all(|plane| {
        let positive = Vec3::select(plane.normal.cmpge(Vec3::ZERO), max, min);
        plane.signed_distance(positive) >= 0.0
    })
}
