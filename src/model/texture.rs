use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec4};

use crate::error::ShadingError;

/// How stored texel values are interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Stored values are linear (normal maps, metallic-roughness).
    #[default]
    Linear,
    /// Stored values are sRGB encoded and decoded to linear on load (albedo).
    Srgb,
}

/// Addressing and filtering applied at sample time. Mirrors the subset of
/// `wgpu::SamplerDescriptor` that affects a single mip level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
}

impl Sampler {
    pub fn repeat() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            filter: wgpu::FilterMode::Linear,
        }
    }

    pub fn clamp() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            filter: wgpu::FilterMode::Linear,
        }
    }

    pub fn nearest(mut self) -> Self {
        self.filter = wgpu::FilterMode::Nearest;
        self
    }

    pub fn descriptor<'a>(&self, label: Option<&'a str>) -> wgpu::SamplerDescriptor<'a> {
        wgpu::SamplerDescriptor {
            label,
            address_mode_u: self.address_mode_u,
            address_mode_v: self.address_mode_v,
            address_mode_w: self.address_mode_u,
            mag_filter: self.filter,
            min_filter: self.filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::repeat()
    }
}

/// A single-level 2D texture held in linear RGBA floats.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
    pub sampler: Sampler,
}

impl Texture {
    pub fn from_texels(width: u32, height: u32, texels: Vec<Vec4>, sampler: Sampler) -> Result<Self, ShadingError> {
        if width == 0 || height == 0 {
            return Err(ShadingError::EmptyTexture { width, height });
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(ShadingError::TexelCountMismatch { expected, actual: texels.len() });
        }

        Ok(Self { width, height, texels, sampler })
    }

    pub fn from_rgba8(image: &image::RgbaImage, color_space: ColorSpace, sampler: Sampler) -> Result<Self, ShadingError> {
        let texels = image
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0.map(|c| c as f32 / 255.0);
                match color_space {
                    ColorSpace::Linear => Vec4::new(r, g, b, a),
                    ColorSpace::Srgb => Vec4::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a),
                }
            })
            .collect();

        Self::from_texels(image.width(), image.height(), texels, sampler)
    }

    pub fn from_path(path: &Path, color_space: ColorSpace, sampler: Sampler) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("Failed to open texture {}", path.display()))?;
        let rgba = img.to_rgba8();
        log::debug!(
            "Loaded texture {} ({}x{}, {:?})",
            path.display(),
            rgba.width(),
            rgba.height(),
            color_space
        );

        Ok(Self::from_rgba8(&rgba, color_space, sampler)?)
    }

    /// 1x1 texture of a single color.
    pub fn solid(color: Vec4) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![color],
            sampler: Sampler::default(),
        }
    }

    pub fn white() -> Self {
        Self::solid(Vec4::ONE)
    }

    /// Tangent-space normal map encoding an unperturbed `(0, 0, 1)` normal.
    pub fn flat_normal() -> Self {
        Self::solid(Vec4::new(0.5, 0.5, 1.0, 1.0))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel at integer coordinates, `None` outside the texture.
    pub fn texel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Samples at normalized coordinates, origin at the top-left texel.
    ///
    /// Coordinates are first folded into a bounded range that the address mode
    /// resolves identically, so any finite or infinite input stays well
    /// defined. NaN samples the top-left corner.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let uv = Vec2::new(
            reduce(uv.x, self.sampler.address_mode_u),
            reduce(uv.y, self.sampler.address_mode_v),
        );
        match self.sampler.filter {
            wgpu::FilterMode::Nearest => {
                let x = (uv.x * self.width as f32).floor() as i64;
                let y = (uv.y * self.height as f32).floor() as i64;
                self.fetch(x, y)
            }
            wgpu::FilterMode::Linear => {
                let x = uv.x * self.width as f32 - 0.5;
                let y = uv.y * self.height as f32 - 0.5;
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let top = self.fetch(x0, y0).lerp(self.fetch(x0 + 1, y0), fx);
                let bottom = self.fetch(x0, y0 + 1).lerp(self.fetch(x0 + 1, y0 + 1), fx);
                top.lerp(bottom, fy)
            }
        }
    }

    fn fetch(&self, x: i64, y: i64) -> Vec4 {
        let x = address(x, self.width, self.sampler.address_mode_u);
        let y = address(y, self.height, self.sampler.address_mode_v);
        match (x, y) {
            // Transparent black border, wgpu's default border color.
            (Some(x), Some(y)) => self.texel(x, y).unwrap_or(Vec4::ZERO),
            _ => Vec4::ZERO,
        }
    }
}

/// Folds a normalized coordinate into `[-1, 2]` without changing what the
/// address mode resolves it to.
fn reduce(t: f32, mode: wgpu::AddressMode) -> f32 {
    if t.is_nan() {
        return 0.0;
    }
    match mode {
        wgpu::AddressMode::Repeat if t.is_finite() => t.rem_euclid(1.0),
        wgpu::AddressMode::MirrorRepeat if t.is_finite() => t.rem_euclid(2.0),
        wgpu::AddressMode::Repeat | wgpu::AddressMode::MirrorRepeat => 0.0,
        wgpu::AddressMode::ClampToEdge | wgpu::AddressMode::ClampToBorder => t.clamp(-1.0, 2.0),
    }
}

fn address(coord: i64, extent: u32, mode: wgpu::AddressMode) -> Option<u32> {
    let n = extent as i64;
    let resolved = match mode {
        wgpu::AddressMode::ClampToEdge => coord.clamp(0, n - 1),
        wgpu::AddressMode::Repeat => coord.rem_euclid(n),
        wgpu::AddressMode::MirrorRepeat => {
            let m = coord.rem_euclid(2 * n);
            if m >= n { 2 * n - 1 - m } else { m }
        }
        wgpu::AddressMode::ClampToBorder => {
            if coord < 0 || coord >= n {
                return None;
            }
            coord
        }
    };
    Some(resolved as u32)
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
