//! The two shading stages and the interpolation step between them.
//!
//! Both stages are plain functions over immutable inputs. Nothing here keeps
//! state between invocations, so vertices and fragments can be shaded in any
//! order or in parallel.

pub mod fragment;
pub mod interpolate;
pub mod vertex;

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::error::ShadingError;

pub use fragment::{fragment_main, BlinnPhong};
pub use interpolate::{barycentric, perspective_weights, to_screen};
pub use vertex::{run_vertices, vertex_main, VertexOutput};

pub const BASIC_AMBIENT_FRACTION: f32 = 0.3;
pub const NORMAL_MAPPED_AMBIENT_FRACTION: f32 = 0.1;
pub const DEFAULT_SHININESS: f32 = 32.0;
/// Lower bound on light-to-fragment distance before the inverse-square falloff.
pub const MIN_LIGHT_DISTANCE: f32 = 1e-3;

/// Pipeline revision, from cheapest to most complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ShadingVariant {
    /// Per-vertex normal against a fixed directional light, grayscale output.
    Flat,
    /// Diffuse texture with a normal map added as a flat offset.
    Textured,
    /// Tangent-space normal mapping, Blinn-Phong point light and attenuation.
    #[default]
    NormalMapped,
}

impl ShadingVariant {
    pub const ALL: [ShadingVariant; 3] = [Self::Flat, Self::Textured, Self::NormalMapped];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Textured => "textured",
            Self::NormalMapped => "normal-mapped",
        }
    }

    pub fn uses_tangent_space(&self) -> bool {
        matches!(self, Self::NormalMapped)
    }
}

impl fmt::Display for ShadingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShadingVariant {
    type Err = ShadingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ShadingError::UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingConfig {
    pub variant: ShadingVariant,
    /// Share of the diffuse color that is lit regardless of the light.
    pub ambient_fraction: f32,
    pub shininess: f32,
    /// Direction towards the fixed light used by the `Flat` and `Textured` variants.
    pub directional_light: Vec3,
    pub min_light_distance: f32,
    /// Fold the metallic-roughness sample into the specular term.
    pub use_metallic_roughness: bool,
}

impl ShadingConfig {
    pub fn for_variant(variant: ShadingVariant) -> Self {
        let ambient_fraction = match variant {
            ShadingVariant::Flat | ShadingVariant::Textured => BASIC_AMBIENT_FRACTION,
            ShadingVariant::NormalMapped => NORMAL_MAPPED_AMBIENT_FRACTION,
        };

        Self {
            variant,
            ambient_fraction,
            shininess: DEFAULT_SHININESS,
            directional_light: Vec3::ONE,
            min_light_distance: MIN_LIGHT_DISTANCE,
            use_metallic_roughness: false,
        }
    }

    pub fn validate(&self) -> Result<(), ShadingError> {
        if !(0.0..=1.0).contains(&self.ambient_fraction) {
            return Err(ShadingError::InvalidConfig {
                field: "ambient_fraction",
                value: self.ambient_fraction,
            });
        }
        if !self.shininess.is_finite() || self.shininess < 0.0 {
            return Err(ShadingError::InvalidConfig {
                field: "shininess",
                value: self.shininess,
            });
        }
        if !self.min_light_distance.is_finite() || self.min_light_distance <= 0.0 {
            return Err(ShadingError::InvalidConfig {
                field: "min_light_distance",
                value: self.min_light_distance,
            });
        }
        if self.directional_light.try_normalize().is_none() {
            return Err(ShadingError::InvalidConfig {
                field: "directional_light",
                value: self.directional_light.length(),
            });
        }
        Ok(())
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self::for_variant(ShadingVariant::default())
    }
}

/// Normalizes `v`, or returns `fallback` when `v` has no usable direction.
pub(crate) fn unit_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names_round_trip() {
        for variant in ShadingVariant::ALL {
            assert_eq!(variant.to_string().parse::<ShadingVariant>(), Ok(variant));
        }
        assert_eq!("Normal-Mapped".parse::<ShadingVariant>(), Ok(ShadingVariant::NormalMapped));
        assert_eq!(
            "phong".parse::<ShadingVariant>(),
            Err(ShadingError::UnknownVariant("phong".to_string()))
        );
        assert_eq!(
            ShadingError::UnknownVariant("phong".to_string()).to_string(),
            "unknown shading variant 'phong'"
        );
    }

    #[test]
    fn test_config_constants_per_variant() {
        assert_eq!(ShadingConfig::for_variant(ShadingVariant::Flat).ambient_fraction, 0.3);
        assert_eq!(ShadingConfig::for_variant(ShadingVariant::Textured).ambient_fraction, 0.3);

        let config = ShadingConfig::default();
        assert_eq!(config.variant, ShadingVariant::NormalMapped);
        assert_eq!(config.ambient_fraction, 0.1);
        assert_eq!(config.shininess, 32.0);
        assert!(!config.use_metallic_roughness);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ShadingConfig::default();
        config.ambient_fraction = 1.5;
        assert_eq!(
            config.validate(),
            Err(ShadingError::InvalidConfig { field: "ambient_fraction", value: 1.5 })
        );

        let mut config = ShadingConfig::default();
        config.min_light_distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = ShadingConfig::for_variant(ShadingVariant::Flat);
        config.directional_light = Vec3::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unit_or_guards_zero_vectors() {
        assert_eq!(unit_or(Vec3::ZERO, Vec3::Z), Vec3::Z);
        assert_eq!(unit_or(Vec3::new(0.0, 3.0, 0.0), Vec3::Z), Vec3::Y);
        assert_eq!(unit_or(Vec3::splat(f32::NAN), Vec3::X), Vec3::X);
    }
}
