use glam::{Mat3, Vec3, Vec4, Vec4Swizzles};

use super::{unit_or, ShadingConfig, ShadingVariant, VertexOutput};
use crate::model::Material;
use crate::scene::Light;

/// Lighting factors for one fragment against the point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinnPhong {
    pub diffuse: f32,
    pub specular: f32,
    pub attenuation: f32,
}

pub fn fragment_main(
    input: &VertexOutput,
    material: &Material,
    light: &Light,
    camera_position: Vec3,
    config: &ShadingConfig,
) -> Vec4 {
    match config.variant {
        ShadingVariant::Flat => shade_flat(input, config),
        ShadingVariant::Textured => shade_textured(input, material, config),
        ShadingVariant::NormalMapped => shade_normal_mapped(input, material, light, camera_position, config),
    }
}

/// Remaps a normal-map sample from storage range [0, 1] to [-1, 1].
pub fn decode_normal(sample: Vec3) -> Vec3 {
    sample * 2.0 - Vec3::ONE
}

/// Takes a tangent-space normal into world space through the TBN basis.
///
/// The interpolated basis vectors are renormalized first; the result is unit
/// length, falling back to the geometric normal when the sample is degenerate.
pub fn tbn_normal(tangent: Vec3, bitangent: Vec3, normal: Vec3, tangent_space: Vec3) -> Vec3 {
    let n = unit_or(normal, Vec3::Z);
    let t = unit_or(tangent, Vec3::X);
    let b = unit_or(bitangent, Vec3::Y);
    let tbn = Mat3::from_cols(t, b, n);
    unit_or(tbn * tangent_space, n)
}

pub fn diffuse_factor(normal: Vec3, light_dir: Vec3) -> f32 {
    normal.dot(light_dir).max(0.0)
}

pub fn specular_factor(normal: Vec3, halfway: Vec3, shininess: f32) -> f32 {
    normal.dot(halfway).max(0.0).powf(shininess)
}

/// Inverse-square falloff, with the distance clamped away from zero.
pub fn attenuation(distance: f32, min_distance: f32) -> f32 {
    let distance = distance.max(min_distance);
    1.0 / (distance * distance)
}

/// Fixed directional light: `ambient + (1 - ambient) * max(n.l, 0)`.
pub fn directional_intensity(normal: Vec3, light_dir: Vec3, ambient_fraction: f32) -> f32 {
    let n = unit_or(normal, Vec3::Z);
    let l = unit_or(light_dir, n);
    ambient_fraction + (1.0 - ambient_fraction) * diffuse_factor(n, l)
}

pub fn blinn_phong(
    normal: Vec3,
    frag_pos: Vec3,
    light_position: Vec3,
    camera_position: Vec3,
    shininess: f32,
    min_distance: f32,
) -> BlinnPhong {
    let to_light = light_position - frag_pos;
    let light_dir = unit_or(to_light, normal);
    let view_dir = unit_or(camera_position - frag_pos, normal);
    let halfway = unit_or(light_dir + view_dir, normal);

    BlinnPhong {
        diffuse: diffuse_factor(normal, light_dir),
        specular: specular_factor(normal, halfway, shininess),
        attenuation: attenuation(to_light.length(), min_distance),
    }
}

fn shade_flat(input: &VertexOutput, config: &ShadingConfig) -> Vec4 {
    let intensity = directional_intensity(input.normal, config.directional_light, config.ambient_fraction);
    Vec4::new(intensity, intensity, intensity, 1.0)
}

fn shade_textured(input: &VertexOutput, material: &Material, config: &ShadingConfig) -> Vec4 {
    let diffuse_color = material.sample_diffuse(input.tex_coords);
    let tangent_normal = decode_normal(material.sample_normal(input.tex_coords));

    let base = unit_or(input.normal, Vec3::Z);
    let normal = unit_or(base + tangent_normal * 0.5, base);
    let intensity = directional_intensity(normal, config.directional_light, config.ambient_fraction);

    (diffuse_color.xyz() * intensity).extend(diffuse_color.w)
}

fn shade_normal_mapped(
    input: &VertexOutput,
    material: &Material,
    light: &Light,
    camera_position: Vec3,
    config: &ShadingConfig,
) -> Vec4 {
    let diffuse_color = material.sample_diffuse(input.tex_coords);
    let tangent_normal = decode_normal(material.sample_normal(input.tex_coords));
    let normal = tbn_normal(input.tangent, input.bitangent, input.normal, tangent_normal);

    let mut shininess = config.shininess;
    let mut specular_strength = 1.0;
    let mut specular_tint = Vec3::ONE;
    if config.use_metallic_roughness {
        let (metallic, roughness) = material.sample_metallic_roughness(input.tex_coords);
        let smoothness = 1.0 - roughness;
        shininess = 1.0 + (config.shininess - 1.0) * smoothness;
        specular_strength = smoothness;
        specular_tint = Vec3::ONE.lerp(diffuse_color.xyz(), metallic);
    }

    let lighting = blinn_phong(
        normal,
        input.frag_pos,
        light.position,
        camera_position,
        shininess,
        config.min_light_distance,
    );
    let radiance = light.color * light.intensity * lighting.attenuation;

    let ambient = config.ambient_fraction * diffuse_color.xyz();
    let diffuse = lighting.diffuse * radiance;
    let specular = lighting.specular * specular_strength * specular_tint * radiance;
    let rgb = (ambient + diffuse + specular) * diffuse_color.xyz();

    rgb.extend(diffuse_color.w)
}
