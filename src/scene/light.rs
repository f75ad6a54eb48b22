use glam::Vec3;

use crate::error::ShadingError;

/// A single point light.
///
/// `range` travels with the light into the uniform block but does not cut off
/// the falloff; attenuation is pure inverse-square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub range: f32,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            range: 100.0,
            color,
            intensity,
        }
    }

    pub fn validate(&self) -> Result<(), ShadingError> {
        if !self.position.is_finite() {
            return Err(ShadingError::InvalidLight("position must be finite"));
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(ShadingError::InvalidLight("intensity must be finite and non-negative"));
        }
        if !self.range.is_finite() || self.range < 0.0 {
            return Err(ShadingError::InvalidLight("range must be finite and non-negative"));
        }
        if !self.color.is_finite() {
            return Err(ShadingError::InvalidLight("color must be finite"));
        }
        if self.color.min_element() < 0.0 || self.color.max_element() > 1.0 {
            log::debug!("light color {:?} lies outside [0, 1]", self.color);
        }
        Ok(())
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::new(2.0, 4.0, 2.0), Vec3::ONE, 1.5)
    }
}
