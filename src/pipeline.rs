use glam::{Vec3, Vec4};

use crate::error::ShadingError;
use crate::model::{Material, ModelVertex};
use crate::scene::{CameraState, Light, ModelState};
use crate::shading::{fragment_main, run_vertices, vertex_main, ShadingConfig, VertexOutput};

/// The resources bound for one draw, read-only for its duration.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub camera: &'a CameraState,
    pub model: &'a ModelState,
    pub material: &'a Material,
    pub light: &'a Light,
}

/// A configured, validated draw: one shading variant over one set of bindings.
///
/// All checks happen in [`ShadingPipeline::new`]; the per-vertex and
/// per-fragment entry points are infallible and take `&self`, so a pipeline
/// can be shared across threads for the whole draw.
#[derive(Debug, Clone, Copy)]
pub struct ShadingPipeline<'a> {
    config: ShadingConfig,
    bindings: Bindings<'a>,
}

impl<'a> ShadingPipeline<'a> {
    pub fn new(config: ShadingConfig, bindings: Bindings<'a>) -> Result<Self, ShadingError> {
        config.validate()?;
        bindings.light.validate()?;

        log::debug!(
            "Shading pipeline ready: variant={}, material='{}', ambient={}, shininess={}",
            config.variant,
            bindings.material.name,
            config.ambient_fraction,
            config.shininess
        );

        Ok(Self { config, bindings })
    }

    pub fn config(&self) -> &ShadingConfig {
        &self.config
    }

    pub fn bindings(&self) -> &Bindings<'a> {
        &self.bindings
    }

    pub fn camera_position(&self) -> Vec3 {
        self.bindings.camera.position()
    }

    pub fn shade_vertex(&self, vertex: &ModelVertex) -> VertexOutput {
        vertex_main(vertex, self.bindings.model, self.bindings.camera, self.config.variant)
    }

    pub fn shade_vertices(&self, vertices: &[ModelVertex]) -> Vec<VertexOutput> {
        run_vertices(vertices, self.bindings.model, self.bindings.camera, self.config.variant)
    }

    pub fn shade_fragment(&self, input: &VertexOutput) -> Vec4 {
        fragment_main(
            input,
            self.bindings.material,
            self.bindings.light,
            self.camera_position(),
            &self.config,
        )
    }

    /// Interpolates a triangle's vertex outputs at screen-space barycentrics
    /// and shades the result. `None` when the weights are degenerate.
    pub fn shade_triangle_at(&self, triangle: &[VertexOutput; 3], bary: Vec3) -> Option<Vec4> {
        VertexOutput::interpolate(triangle, bary).map(|input| self.shade_fragment(&input))
    }
}
