mod texture;
mod material;
mod vertex;

pub use texture::{linear_to_srgb, srgb_to_linear, ColorSpace, Sampler, Texture};
pub use material::Material;
pub use vertex::ModelVertex;
