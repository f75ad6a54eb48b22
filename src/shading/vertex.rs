use glam::{Mat3, Vec2, Vec3, Vec4, Vec4Swizzles};

use super::{unit_or, ShadingVariant};
use crate::model::ModelVertex;
use crate::scene::{CameraState, ModelState};

/// Vertex stage output, ready for interpolation across a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    /// World-space position; lighting happens in world space.
    pub frag_pos: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

pub fn vertex_main(
    vertex: &ModelVertex,
    model: &ModelState,
    camera: &CameraState,
    variant: ShadingVariant,
) -> VertexOutput {
    let world_position = model.model() * Vec3::from(vertex.position).extend(1.0);
    let clip_position = camera.view_proj() * world_position;
    let normal = Vec3::from(vertex.normal);

    let (tangent, bitangent, normal) = if variant.uses_tangent_space() {
        let normal_matrix = model.normal_matrix();
        (
            unit_or(normal_matrix * Vec3::from(vertex.tangent), Vec3::X),
            unit_or(normal_matrix * Vec3::from(vertex.bitangent), Vec3::Y),
            unit_or(normal_matrix * normal, Vec3::Z),
        )
    } else {
        // Earlier revisions only bind the model matrix.
        let linear = Mat3::from_mat4(model.model());
        (Vec3::ZERO, Vec3::ZERO, unit_or(linear * normal, Vec3::Z))
    };

    VertexOutput {
        clip_position,
        frag_pos: world_position.xyz(),
        tex_coords: Vec2::from(vertex.tex_coords),
        tangent,
        bitangent,
        normal,
    }
}

pub fn run_vertices(
    vertices: &[ModelVertex],
    model: &ModelState,
    camera: &CameraState,
    variant: ShadingVariant,
) -> Vec<VertexOutput> {
    vertices
        .iter()
        .map(|vertex| vertex_main(vertex, model, camera, variant))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Mat4;

    fn vertex() -> ModelVertex {
        ModelVertex {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 0.0, 1.0],
            tex_coords: [0.25, 0.75],
            tangent: [1.0, 0.0, 0.0],
            bitangent: [0.0, 1.0, 0.0],
        }
    }

    fn camera() -> CameraState {
        CameraState::new(Mat4::IDENTITY, Vec3::new(0.0, 0.0, 10.0)).unwrap()
    }

    #[test]
    fn test_positions_follow_model_and_view_projection() {
        let model = ModelState::new(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0))).unwrap();
        let view_proj = Mat4::from_scale(Vec3::new(0.5, 0.5, 0.5));
        let camera = CameraState::new(view_proj, Vec3::ZERO).unwrap();

        let out = vertex_main(&vertex(), &model, &camera, ShadingVariant::NormalMapped);
        assert_eq!(out.frag_pos, Vec3::new(11.0, 2.0, 3.0));
        assert_eq!(out.clip_position, Vec4::new(5.5, 1.0, 1.5, 1.0));
        assert_eq!(out.tex_coords, Vec2::new(0.25, 0.75));
    }

    #[test]
    fn test_tangent_frame_uses_normal_matrix_and_is_unit() {
        let model = ModelState::new(Mat4::from_scale(Vec3::new(3.0, 0.5, 7.0))).unwrap();
        let mut v = vertex();
        v.normal = [1.0, 1.0, 1.0];
        v.tangent = [1.0, -1.0, 0.0];

        let out = vertex_main(&v, &model, &camera(), ShadingVariant::NormalMapped);
        assert_relative_eq!(out.normal.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(out.tangent.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(out.bitangent.length(), 1.0, epsilon = 1e-6);

        let expected = (model.normal_matrix() * Vec3::ONE).normalize();
        assert_relative_eq!(out.normal.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(out.normal.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(out.normal.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn test_basic_variants_renormalize_model_transformed_normal() {
        let model = ModelState::new(Mat4::from_scale(Vec3::splat(5.0))).unwrap();
        for variant in [ShadingVariant::Flat, ShadingVariant::Textured] {
            let out = vertex_main(&vertex(), &model, &camera(), variant);
            assert_relative_eq!(out.normal.z, 1.0, epsilon = 1e-6);
            assert_eq!(out.tangent, Vec3::ZERO);
            assert_eq!(out.bitangent, Vec3::ZERO);
        }
    }

    #[test]
    fn test_degenerate_basis_falls_back() {
        let mut v = vertex();
        v.normal = [0.0; 3];
        v.tangent = [0.0; 3];
        let out = vertex_main(&v, &ModelState::identity(), &camera(), ShadingVariant::NormalMapped);
        assert_eq!(out.normal, Vec3::Z);
        assert_eq!(out.tangent, Vec3::X);
    }

    #[test]
    fn test_run_vertices_maps_each_vertex() {
        let vertices = [vertex(), vertex(), vertex()];
        let outputs = run_vertices(&vertices, &ModelState::identity(), &camera(), ShadingVariant::Flat);
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|o| o.frag_pos == Vec3::new(1.0, 2.0, 3.0)));
    }
}
