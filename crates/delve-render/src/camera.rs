use glam::{Mat4, Vec3};

/// First-person fly camera. Yaw 0 looks down -Z; positive pitch looks up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 24.0, 0.0))
    }
}

impl FlyCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: -0.3,
            fov_y_rad: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 500.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            -self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    pub fn look(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-1.5, 1.5);
    }

    /// Move along a world-space direction, ignoring the view orientation.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_to_rh(self.position, self.forward(), Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y_rad, aspect, self.near, self.far);
        proj * view
    }
}
