use glam::{Mat4, Vec3};

use crate::error::ShadingError;

pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y axis
    pub pitch: f32, // Rotation around X axis
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Points the camera at `target` by solving for yaw and pitch.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(dir) = (target - self.position).try_normalize() else {
            return;
        };
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-89.0, 89.0);
        self.yaw = dir.z.atan2(dir.x).to_degrees();
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        // wgpu clip space: depth in [0, 1]
        let projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );

        let target = self.position + self.get_view_direction();
        let view = Mat4::look_at_rh(
            self.position,
            target,
            Vec3::Y,
        );

        projection * view
    }

    pub fn get_view_direction(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        Vec3::new(
            yaw_cos * pitch_cos,
            pitch_sin,
            yaw_sin * pitch_cos,
        ).normalize()
    }

    pub fn state(&self) -> Result<CameraState, ShadingError> {
        CameraState::new(self.build_view_projection_matrix(), self.position)
    }
}

/// Per-frame camera snapshot read by both stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    view_proj: Mat4,
    position: Vec3,
}

impl CameraState {
    pub fn new(view_proj: Mat4, position: Vec3) -> Result<Self, ShadingError> {
        let determinant = view_proj.determinant();
        if !determinant.is_finite() || determinant == 0.0 || !position.is_finite() {
            return Err(ShadingError::NonInvertibleViewProjection);
        }
        Ok(Self { view_proj, position })
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}
