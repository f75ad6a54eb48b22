use glam::{Mat3, Mat4, Vec3};

use crate::error::ShadingError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation = Mat4::from_euler(glam::EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        let scale = Mat4::from_scale(self.scale);
        translation * rotation * scale
    }

    pub fn model_state(&self) -> Result<ModelState, ShadingError> {
        ModelState::new(self.to_matrix())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-object transform state read by the vertex stage.
///
/// The normal matrix is the inverse-transpose of the model's upper 3x3 and is
/// computed here, whenever a model matrix is set, so the two can never drift
/// apart and the vertex stage never inverts anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelState {
    model: Mat4,
    normal: Mat3,
}

impl ModelState {
    pub fn new(model: Mat4) -> Result<Self, ShadingError> {
        let linear = Mat3::from_mat4(model);
        let determinant = linear.determinant();
        if !determinant.is_finite() || determinant.abs() <= f32::MIN_POSITIVE {
            return Err(ShadingError::SingularModelMatrix { determinant });
        }

        Ok(Self {
            model,
            normal: linear.inverse().transpose(),
        })
    }

    pub fn identity() -> Self {
        Self {
            model: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
        }
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn normal_matrix(&self) -> Mat3 {
        self.normal
    }

    pub fn set_model(&mut self, model: Mat4) -> Result<(), ShadingError> {
        *self = Self::new(model)?;
        Ok(())
    }
}

impl Default for ModelState {
    fn default() -> Self {
        Self::identity()
    }
}
