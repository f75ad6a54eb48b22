use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use super::texture::Texture;

/// Material bindings for the fragment stage.
///
/// Every slot is always populated: a missing diffuse or metallic-roughness
/// source is a white 1x1 texture and a missing normal map is a flat one, so
/// the sampling paths never branch on presence.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse_texture: Texture,
    pub normal_texture: Texture,
    pub metallic_roughness_texture: Texture,
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_texture: Texture::white(),
            normal_texture: Texture::flat_normal(),
            metallic_roughness_texture: Texture::white(),
            base_color_factor: Vec4::ONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
        }
    }

    pub fn with_diffuse(mut self, texture: Texture) -> Self {
        self.diffuse_texture = texture;
        self
    }

    pub fn with_normal(mut self, texture: Texture) -> Self {
        self.normal_texture = texture;
        self
    }

    pub fn with_metallic_roughness(mut self, texture: Texture) -> Self {
        self.metallic_roughness_texture = texture;
        self
    }

    pub fn sample_diffuse(&self, uv: Vec2) -> Vec4 {
        self.diffuse_texture.sample(uv) * self.base_color_factor
    }

    /// Raw normal-map sample in storage range [0, 1].
    pub fn sample_normal(&self, uv: Vec2) -> Vec3 {
        self.normal_texture.sample(uv).xyz()
    }

    /// Returns `(metallic, roughness)` using the glTF channel packing
    /// (roughness in G, metallic in B).
    pub fn sample_metallic_roughness(&self, uv: Vec2) -> (f32, f32) {
        let mr = self.metallic_roughness_texture.sample(uv);
        (
            (mr.z * self.metallic_factor).clamp(0.0, 1.0),
            (mr.y * self.roughness_factor).clamp(0.0, 1.0),
        )
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}
