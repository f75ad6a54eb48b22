use glam::{Vec2, Vec3, Vec3Swizzles, Vec4};
use image::{Rgba, RgbaImage};

use crate::error::ShadingError;
use crate::model::{linear_to_srgb, ColorSpace, Material, ModelVertex, Sampler, Texture};
use crate::pipeline::{Bindings, ShadingPipeline};
use crate::scene::{Camera, CameraState, Light, ModelState, Transform};
use crate::shading::{barycentric, interpolate::covers, to_screen, ShadingConfig, VertexOutput};

const CLEAR_COLOR: Rgba<u8> = Rgba([25, 25, 38, 255]);

/// Everything one draw of the demo floor needs.
pub struct DemoScene {
    pub camera: CameraState,
    pub model: ModelState,
    pub material: Material,
    pub light: Light,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl DemoScene {
    pub fn bindings(&self) -> Bindings<'_> {
        Bindings {
            camera: &self.camera,
            model: &self.model,
            material: &self.material,
            light: &self.light,
        }
    }
}

pub fn create_demo_scene(width: u32, height: u32, light_intensity: f32) -> Result<DemoScene, ShadingError> {
    let mut camera = Camera::new(
        Vec3::new(0.0, 8.0, 16.0),
        width as f32 / height.max(1) as f32,
    );
    camera.look_at(Vec3::ZERO);

    // Floor plane (20x20 meters); v runs along +z, so the bitangent does too
    let floor_vertex = |x: f32, z: f32, u: f32, v: f32| ModelVertex {
        position: [x, 0.0, z],
        normal: [0.0, 1.0, 0.0],
        tex_coords: [u, v],
        tangent: [1.0, 0.0, 0.0],
        bitangent: [0.0, 0.0, 1.0],
    };
    let vertices = vec![
        floor_vertex(-10.0, -10.0, 0.0, 0.0),
        floor_vertex(10.0, -10.0, 1.0, 0.0),
        floor_vertex(10.0, 10.0, 1.0, 1.0),
        floor_vertex(-10.0, 10.0, 0.0, 1.0),
    ];
    let indices = vec![0, 2, 1, 0, 3, 2];

    let texture_size = 256u32;
    let diffuse = Texture::from_rgba8(
        &create_checkerboard_texture(texture_size),
        ColorSpace::Srgb,
        Sampler::repeat(),
    )?;
    let normal = Texture::from_rgba8(
        &create_bump_normal_map(texture_size),
        ColorSpace::Linear,
        Sampler::repeat(),
    )?;
    // Metallic in blue, roughness in green
    let metallic_roughness = Texture::solid(Vec4::new(0.0, 0.4, 0.0, 1.0));

    let material = Material::new("floor")
        .with_diffuse(diffuse)
        .with_normal(normal)
        .with_metallic_roughness(metallic_roughness);

    let light = Light::new(Vec3::new(0.0, 4.0, 0.0), Vec3::ONE, light_intensity);

    Ok(DemoScene {
        camera: camera.state()?,
        model: Transform::new().model_state()?,
        material,
        light,
        vertices,
        indices,
    })
}

pub fn create_checkerboard_texture(size: u32) -> RgbaImage {
    let square_size = (size / 8).max(1); // 8x8 checkerboard
    RgbaImage::from_fn(size, size, |x, y| {
        let is_white = ((x / square_size) + (y / square_size)) % 2 == 0;
        let color = if is_white { 200u8 } else { 50u8 };
        Rgba([color, color, color, 255])
    })
}

/// Tangent-space normal map with one hemispherical bump per checker square.
pub fn create_bump_normal_map(size: u32) -> RgbaImage {
    let cell = (size / 8).max(1) as f32;
    let radius = cell * 0.4;
    RgbaImage::from_fn(size, size, |x, y| {
        let local = Vec2::new(
            (x as f32 + 0.5) % cell - cell * 0.5,
            (y as f32 + 0.5) % cell - cell * 0.5,
        ) / radius;
        let d2 = local.length_squared();
        let normal = if d2 < 1.0 {
            Vec3::new(local.x, local.y, (1.0 - d2).sqrt()).normalize()
        } else {
            Vec3::Z
        };
        let encoded = (normal * 0.5 + Vec3::splat(0.5)) * 255.0;
        Rgba([
            encoded.x.round() as u8,
            encoded.y.round() as u8,
            encoded.z.round() as u8,
            255,
        ])
    })
}

/// Shades the scene on the CPU: vertex stage, a bounding-box rasterizer with
/// a depth buffer, then the fragment stage per covered pixel center.
pub fn render(scene: &DemoScene, config: ShadingConfig, width: u32, height: u32) -> Result<RgbaImage, ShadingError> {
    let pipeline = ShadingPipeline::new(config, scene.bindings())?;
    let outputs = pipeline.shade_vertices(&scene.vertices);

    let mut image = RgbaImage::from_pixel(width, height, CLEAR_COLOR);
    let mut depth = vec![f32::INFINITY; pixel_index(0, height, width)];
    let mut shaded = 0usize;

    for tri in scene.indices.chunks_exact(3) {
        let triangle = [
            outputs[tri[0] as usize],
            outputs[tri[1] as usize],
            outputs[tri[2] as usize],
        ];
        shaded += rasterize_triangle(&pipeline, &triangle, &mut image, &mut depth);
    }

    log::info!(
        "Rendered {}x{} frame with {} variant ({} fragments)",
        width,
        height,
        config.variant,
        shaded
    );
    Ok(image)
}

fn rasterize_triangle(
    pipeline: &ShadingPipeline<'_>,
    triangle: &[VertexOutput; 3],
    image: &mut RgbaImage,
    depth: &mut [f32],
) -> usize {
    let (width, height) = image.dimensions();

    // No clipping: triangles crossing the camera plane are dropped whole
    if triangle.iter().any(|v| v.clip_position.w <= 0.0) {
        return 0;
    }
    let mut screen = [Vec3::ZERO; 3];
    for (out, v) in screen.iter_mut().zip(triangle) {
        match to_screen(v.clip_position, width, height) {
            Some(p) => *out = p,
            None => return 0,
        }
    }
    let [a, b, c] = screen.map(|p| p.xy());

    let min = a.min(b).min(c).floor().max(Vec2::ZERO);
    let max = a.max(b).max(c).ceil().min(Vec2::new(width as f32, height as f32));
    if min.x >= max.x || min.y >= max.y {
        return 0;
    }

    let mut count = 0;
    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some(bary) = barycentric(p, a, b, c) else {
                return count;
            };
            if !covers(bary) {
                continue;
            }

            let z = bary.dot(Vec3::new(screen[0].z, screen[1].z, screen[2].z));
            let index = pixel_index(x, y, width);
            if !(0.0..=1.0).contains(&z) || z >= depth[index] {
                continue;
            }

            if let Some(color) = pipeline.shade_triangle_at(triangle, bary) {
                depth[index] = z;
                image.put_pixel(x, y, encode_srgb(color));
                count += 1;
            }
        }
    }
    count
}

/// Row-major index into a `width`-wide buffer, computed in `usize`.
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

fn encode_srgb(color: Vec4) -> Rgba<u8> {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        to_byte(linear_to_srgb(color.x)),
        to_byte(linear_to_srgb(color.y)),
        to_byte(linear_to_srgb(color.z)),
        to_byte(color.w),
    ])
}
