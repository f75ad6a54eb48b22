//! GPU-side contract of the shading pipeline: uniform blocks, bind group and
//! vertex layouts per variant, and the matching WGSL sources.
//!
//! Group/slot assignments are fixed so that a CPU-shaded frame and a
//! GPU-shaded frame can share one external pipeline configuration:
//!
//! | group | slots | resource |
//! |---|---|---|
//! | 0 | 0 | camera uniform |
//! | 1 | 0 | model uniform |
//! | 2 | 0-5 | diffuse, normal, metallic-roughness texture + sampler pairs |
//! | 3 | 0 | light uniform |

use crate::error::ShadingError;
use crate::model::ModelVertex;
use crate::scene::{CameraState, Light, ModelState};
use crate::shading::ShadingVariant;

pub const CAMERA_GROUP: u32 = 0;
pub const MODEL_GROUP: u32 = 1;
pub const MATERIAL_GROUP: u32 = 2;
pub const LIGHT_GROUP: u32 = 3;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            _padding: 0.0,
        }
    }

    pub fn update(&mut self, camera: &CameraState) {
        self.view_proj = camera.view_proj().to_cols_array_2d();
        self.position = camera.position().to_array();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&CameraState> for CameraUniform {
    fn from(camera: &CameraState) -> Self {
        let mut uniform = Self::new();
        uniform.update(camera);
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model_matrix: [[f32; 4]; 4],
    // mat3x3<f32> columns are padded to 16 bytes in WGSL
    pub normal_matrix: [[f32; 4]; 3],
}

impl From<&ModelState> for ModelUniform {
    fn from(model: &ModelState) -> Self {
        let normal = model.normal_matrix();
        Self {
            model_matrix: model.model().to_cols_array_2d(),
            normal_matrix: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.to_array(),
            range: light.range,
            color: light.color.to_array(),
            intensity: light.intensity,
        }
    }
}

const _: () = assert!(std::mem::size_of::<CameraUniform>() == 80);
const _: () = assert!(std::mem::size_of::<ModelUniform>() == 112);
const _: () = assert!(std::mem::size_of::<LightUniform>() == 32);

/// Size of the camera block each variant reads; earlier revisions stop
/// after the view-projection matrix.
pub fn camera_binding_size(variant: ShadingVariant) -> u64 {
    match variant {
        ShadingVariant::NormalMapped => std::mem::size_of::<CameraUniform>() as u64,
        ShadingVariant::Flat | ShadingVariant::Textured => 64,
    }
}

/// Size of the model block each variant reads; only the final revision
/// carries the normal matrix.
pub fn model_binding_size(variant: ShadingVariant) -> u64 {
    match variant {
        ShadingVariant::NormalMapped => std::mem::size_of::<ModelUniform>() as u64,
        ShadingVariant::Flat | ShadingVariant::Textured => 64,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub fn camera_layout_entries(variant: ShadingVariant) -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![uniform_entry(
        0,
        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        camera_binding_size(variant),
    )]
}

pub fn model_layout_entries(variant: ShadingVariant) -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![uniform_entry(0, wgpu::ShaderStages::VERTEX, model_binding_size(variant))]
}

pub fn material_layout_entries(variant: ShadingVariant) -> Vec<wgpu::BindGroupLayoutEntry> {
    let textures = match variant {
        ShadingVariant::Flat => 0,
        ShadingVariant::Textured => 2,
        ShadingVariant::NormalMapped => 3,
    };
    (0..textures)
        .flat_map(|i| [texture_entry(2 * i), sampler_entry(2 * i + 1)])
        .collect()
}

pub fn light_layout_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![uniform_entry(
        0,
        wgpu::ShaderStages::FRAGMENT,
        std::mem::size_of::<LightUniform>() as u64,
    )]
}

/// Bind group layout entries for every group the variant uses, indexed by group.
pub fn bind_group_layout_entries(variant: ShadingVariant) -> Vec<Vec<wgpu::BindGroupLayoutEntry>> {
    let mut groups = vec![camera_layout_entries(variant), model_layout_entries(variant)];
    if variant != ShadingVariant::Flat {
        groups.push(material_layout_entries(variant));
    }
    if variant == ShadingVariant::NormalMapped {
        groups.push(light_layout_entries());
    }
    groups
}

pub fn vertex_layout(variant: ShadingVariant) -> wgpu::VertexBufferLayout<'static> {
    if variant.uses_tangent_space() {
        ModelVertex::desc()
    } else {
        ModelVertex::basic_desc()
    }
}

/// Checks a vertex buffer layout supplied by the caller against the one the
/// variant's vertex shader expects.
pub fn validate_vertex_layout(
    layout: &wgpu::VertexBufferLayout<'_>,
    variant: ShadingVariant,
) -> Result<(), ShadingError> {
    let expected = vertex_layout(variant);
    if layout.array_stride != expected.array_stride {
        return Err(ShadingError::VertexLayoutMismatch(format!(
            "stride {} (expected {})",
            layout.array_stride, expected.array_stride
        )));
    }
    if layout.step_mode != expected.step_mode {
        return Err(ShadingError::VertexLayoutMismatch(format!(
            "step mode {:?} (expected {:?})",
            layout.step_mode, expected.step_mode
        )));
    }
    for attribute in expected.attributes {
        let found = layout
            .attributes
            .iter()
            .find(|a| a.shader_location == attribute.shader_location);
        match found {
            Some(a) if a == attribute => {}
            Some(a) => {
                return Err(ShadingError::VertexLayoutMismatch(format!(
                    "location {}: {:?} at offset {} (expected {:?} at offset {})",
                    a.shader_location, a.format, a.offset, attribute.format, attribute.offset
                )));
            }
            None => {
                return Err(ShadingError::VertexLayoutMismatch(format!(
                    "missing attribute at location {}",
                    attribute.shader_location
                )));
            }
        }
    }
    Ok(())
}

pub fn shader_source(variant: ShadingVariant) -> &'static str {
    match variant {
        ShadingVariant::Flat => include_str!("shaders/flat.wgsl"),
        ShadingVariant::Textured => include_str!("shaders/textured.wgsl"),
        ShadingVariant::NormalMapped => include_str!("shaders/normal_mapped.wgsl"),
    }
}

/// Render pipeline plus the bind group layouts it was created with.
pub struct GpuPipeline {
    pub variant: ShadingVariant,
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pub render_pipeline: wgpu::RenderPipeline,
}

/// Builds the render pipeline for `variant` on an externally created device.
pub fn create_render_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    variant: ShadingVariant,
) -> GpuPipeline {
    let labels = ["Camera Bind Group Layout", "Model Bind Group Layout", "Material Bind Group Layout", "Light Bind Group Layout"];
    let bind_group_layouts: Vec<wgpu::BindGroupLayout> = bind_group_layout_entries(variant)
        .iter()
        .zip(labels)
        .map(|(entries, label)| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
        })
        .collect();
    let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout"),
        bind_group_layouts: &layout_refs,
        push_constant_ranges: &[],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(variant.name()),
        source: wgpu::ShaderSource::Wgsl(shader_source(variant).into()),
    });

    log::debug!("Creating {} render pipeline for {:?}", variant, format);

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render Pipeline"),
        layout: Some(&render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout(variant)],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    GpuPipeline {
        variant,
        bind_group_layouts,
        render_pipeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn binding_size(entry: &wgpu::BindGroupLayoutEntry) -> Option<u64> {
        match entry.ty {
            wgpu::BindingType::Buffer { min_binding_size, .. } => min_binding_size.map(|s| s.get()),
            _ => None,
        }
    }

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        let light = Light {
            position: Vec3::new(1.0, 2.0, 3.0),
            range: 10.0,
            color: Vec3::new(0.5, 0.25, 1.0),
            intensity: 2.0,
        };
        let uniform = LightUniform::from(&light);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniform));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 10.0, 0.5, 0.25, 1.0, 2.0]);

        let camera = CameraState::new(Mat4::from_scale(Vec3::splat(2.0)), Vec3::new(4.0, 5.0, 6.0)).unwrap();
        let uniform = CameraUniform::from(&camera);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniform));
        assert_eq!(&floats[16..], &[4.0, 5.0, 6.0, 0.0]);
        assert_eq!(floats[0], 2.0);
    }

    #[test]
    fn test_model_uniform_pads_normal_matrix_columns() {
        let model = ModelState::new(Mat4::from_scale(Vec3::new(2.0, 4.0, 8.0))).unwrap();
        let uniform = ModelUniform::from(&model);
        assert_eq!(uniform.normal_matrix[0], [0.5, 0.0, 0.0, 0.0]);
        assert_eq!(uniform.normal_matrix[1], [0.0, 0.25, 0.0, 0.0]);
        assert_eq!(uniform.normal_matrix[2], [0.0, 0.0, 0.125, 0.0]);
        assert_eq!(uniform.model_matrix[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_bind_group_layout_per_variant() {
        let flat = bind_group_layout_entries(ShadingVariant::Flat);
        assert_eq!(flat.len(), 2);
        assert_eq!(binding_size(&flat[CAMERA_GROUP as usize][0]), Some(64));
        assert_eq!(binding_size(&flat[MODEL_GROUP as usize][0]), Some(64));

        let textured = bind_group_layout_entries(ShadingVariant::Textured);
        assert_eq!(textured.len(), 3);
        assert_eq!(textured[MATERIAL_GROUP as usize].len(), 4);

        let full = bind_group_layout_entries(ShadingVariant::NormalMapped);
        assert_eq!(full.len(), 4);
        assert_eq!(binding_size(&full[CAMERA_GROUP as usize][0]), Some(80));
        assert_eq!(binding_size(&full[MODEL_GROUP as usize][0]), Some(112));
        assert_eq!(binding_size(&full[LIGHT_GROUP as usize][0]), Some(32));

        let material = &full[MATERIAL_GROUP as usize];
        let bindings: Vec<u32> = material.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2, 3, 4, 5]);
        for pair in material.chunks(2) {
            assert!(matches!(pair[0].ty, wgpu::BindingType::Texture { .. }));
            assert!(matches!(pair[1].ty, wgpu::BindingType::Sampler(_)));
        }
    }

    #[test]
    fn test_binding_visibility() {
        let full = bind_group_layout_entries(ShadingVariant::NormalMapped);
        assert_eq!(
            full[CAMERA_GROUP as usize][0].visibility,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
        assert_eq!(full[MODEL_GROUP as usize][0].visibility, wgpu::ShaderStages::VERTEX);
        assert_eq!(full[LIGHT_GROUP as usize][0].visibility, wgpu::ShaderStages::FRAGMENT);
    }

    #[test]
    fn test_validate_vertex_layout() {
        for variant in ShadingVariant::ALL {
            assert!(validate_vertex_layout(&vertex_layout(variant), variant).is_ok());
        }
        // The full layout also satisfies the earlier revisions.
        assert!(validate_vertex_layout(&ModelVertex::desc(), ShadingVariant::Flat).is_ok());
        assert!(validate_vertex_layout(&ModelVertex::basic_desc(), ShadingVariant::NormalMapped).is_err());

        let short = wgpu::VertexBufferLayout {
            array_stride: 32,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ModelVertex::BASIC_ATTRIBUTES,
        };
        let err = validate_vertex_layout(&short, ShadingVariant::Flat).unwrap_err();
        assert!(err.to_string().contains("stride 32"));

        let attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];
        let wrong_format = wgpu::VertexBufferLayout {
            array_stride: 56,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };
        assert!(validate_vertex_layout(&wrong_format, ShadingVariant::Textured).is_err());
    }

    #[test]
    fn test_shader_sources_declare_their_bindings() {
        for variant in ShadingVariant::ALL {
            let source = shader_source(variant);
            assert!(source.contains("fn vs_main"), "{variant} lacks vs_main");
            assert!(source.contains("fn fs_main"), "{variant} lacks fs_main");
            assert!(source.contains("@group(0) @binding(0)"));
            assert!(source.contains("@group(1) @binding(0)"));
        }
        assert!(!shader_source(ShadingVariant::Flat).contains("@group(2)"));
        assert!(shader_source(ShadingVariant::Textured).contains("@group(2) @binding(3)"));
        let full = shader_source(ShadingVariant::NormalMapped);
        assert!(full.contains("@group(2) @binding(5)"));
        assert!(full.contains("@group(3) @binding(0)"));
        assert!(full.contains("normal_matrix"));
    }
}
