use thiserror::Error;

/// Configuration errors raised while binding resources to the pipeline.
///
/// The shading stages themselves never fail; everything that can go wrong is
/// caught here, once, before any vertex or fragment is shaded.
#[derive(Debug, Error, PartialEq)]
pub enum ShadingError {
    #[error("view-projection matrix is not invertible")]
    NonInvertibleViewProjection,

    #[error("model matrix has a singular upper 3x3 (determinant {determinant})")]
    SingularModelMatrix { determinant: f32 },

    #[error("invalid light: {0}")]
    InvalidLight(&'static str),

    #[error("invalid shading config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    #[error("texture has zero extent ({width}x{height})")]
    EmptyTexture { width: u32, height: u32 },

    #[error("texture expects {expected} texels, got {actual}")]
    TexelCountMismatch { expected: usize, actual: usize },

    #[error("unknown shading variant '{0}'")]
    UnknownVariant(String),

    #[error("vertex layout mismatch: {0}")]
    VertexLayoutMismatch(String),
}
