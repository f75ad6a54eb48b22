use super::*;
use crate::error::ShadingError;
use approx::assert_relative_eq;
use glam::{Mat3, Mat4, Vec3, Vec4Swizzles};

#[test]
fn test_transform_new() {
    let transform = Transform::new();
    assert_eq!(transform.position, Vec3::ZERO);
    assert_eq!(transform.rotation, Vec3::ZERO);
    assert_eq!(transform.scale, Vec3::ONE);
}

#[test]
fn test_transform_matrix() {
    let mut transform = Transform::new();

    // Test translation
    transform.position = Vec3::new(1.0, 2.0, 3.0);
    let matrix = transform.to_matrix();
    assert_eq!(matrix.col(3).xyz(), Vec3::new(1.0, 2.0, 3.0));

    // Test scale
    transform = Transform::new();
    transform.scale = Vec3::new(2.0, 2.0, 2.0);
    let matrix = transform.to_matrix();
    assert_eq!(matrix.col(0).x, 2.0);
    assert_eq!(matrix.col(1).y, 2.0);
    assert_eq!(matrix.col(2).z, 2.0);
}

#[test]
fn test_normal_matrix_is_inverse_transpose() {
    let mut transform = Transform::new();
    transform.rotation = Vec3::new(0.3, -0.7, 1.1);
    transform.scale = Vec3::new(1.0, 4.0, 0.5);
    transform.position = Vec3::new(5.0, -2.0, 1.0);
    let state = transform.model_state().unwrap();

    let linear = Mat3::from_mat4(state.model());
    let product = state.normal_matrix().transpose() * linear;
    for (col, expected) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
        let got = product.col(col);
        assert_relative_eq!(got.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(got.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(got.z, expected.z, epsilon = 1e-5);
    }
}

#[test]
fn test_normal_matrix_differs_from_model_under_non_uniform_scale() {
    let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
    let state = ModelState::new(model).unwrap();

    // Surface tilted in the x/y plane: tangent (1, -1, 0), normal (1, 1, 0).
    let tangent = Vec3::new(1.0, -1.0, 0.0);
    let normal = Vec3::new(1.0, 1.0, 0.0).normalize();

    let world_tangent = Mat3::from_mat4(model) * tangent;
    let by_model = (Mat3::from_mat4(model) * normal).normalize();
    let by_normal_matrix = (state.normal_matrix() * normal).normalize();

    assert!((by_model - by_normal_matrix).length() > 0.1);
    assert_relative_eq!(by_normal_matrix.dot(world_tangent), 0.0, epsilon = 1e-5);
    assert!(by_model.dot(world_tangent).abs() > 0.1);
}

#[test]
fn test_model_state_rejects_singular_matrix() {
    let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
    assert!(matches!(
        ModelState::new(flat),
        Err(ShadingError::SingularModelMatrix { .. })
    ));

    let mut state = ModelState::identity();
    assert!(state.set_model(flat).is_err());
    assert_eq!(state, ModelState::identity());

    state.set_model(Mat4::from_scale(Vec3::splat(2.0))).unwrap();
    assert_relative_eq!(state.normal_matrix().col(0).x, 0.5, epsilon = 1e-6);
}

#[test]
fn test_light_validation() {
    assert!(Light::default().validate().is_ok());

    let mut light = Light::default();
    light.intensity = -1.0;
    assert_eq!(
        light.validate(),
        Err(ShadingError::InvalidLight("intensity must be finite and non-negative"))
    );

    let mut light = Light::default();
    light.position = Vec3::new(f32::NAN, 0.0, 0.0);
    assert!(light.validate().is_err());

    // Out-of-range color is tolerated.
    let mut light = Light::default();
    light.color = Vec3::splat(2.0);
    assert!(light.validate().is_ok());
}
