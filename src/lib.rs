//! CPU reference and GPU layout for a three-revision shading pipeline:
//! flat directional lighting, textured lighting, and tangent-space normal
//! mapping with a Blinn-Phong point light.

pub mod demo;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod renderer;
pub mod scene;
pub mod shading;

pub use error::ShadingError;
pub use model::{Material, ModelVertex, Texture};
pub use pipeline::{Bindings, ShadingPipeline};
pub use scene::{Camera, CameraState, Light, ModelState, Transform};
pub use shading::{fragment_main, vertex_main, ShadingConfig, ShadingVariant, VertexOutput};
