//! Stand-in for the rasterizer's interpolation step.
//!
//! Screen-space barycentrics are turned into perspective-correct weights using
//! each vertex's clip `w`, and every varying except the clip position is
//! blended with those weights.

use std::ops::{Add, Mul};

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use super::VertexOutput;

const DEGENERATE_EPSILON: f32 = 1e-8;

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Barycentric coordinates of `p` in triangle `abc`, or `None` when the
/// triangle has no area. Components are negative outside the triangle.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<Vec3> {
    let area = edge(a, b, c);
    if area.abs() <= DEGENERATE_EPSILON {
        return None;
    }
    Some(Vec3::new(edge(b, c, p), edge(c, a, p), edge(a, b, p)) / area)
}

pub fn covers(bary: Vec3) -> bool {
    bary.min_element() >= 0.0
}

/// Converts screen-space barycentrics into perspective-correct weights.
pub fn perspective_weights(bary: Vec3, clip_w: [f32; 3]) -> Option<Vec3> {
    let w = Vec3::from(clip_w);
    if w.abs().min_element() <= DEGENERATE_EPSILON {
        return None;
    }
    let q = bary / w;
    let sum = q.x + q.y + q.z;
    if sum.abs() <= DEGENERATE_EPSILON {
        return None;
    }
    Some(q / sum)
}

/// Maps a clip-space position to pixel coordinates (y down) plus NDC depth.
pub fn to_screen(clip: Vec4, width: u32, height: u32) -> Option<Vec3> {
    if clip.w.abs() <= DEGENERATE_EPSILON {
        return None;
    }
    let ndc = clip.xyz() / clip.w;
    Some(Vec3::new(
        (ndc.x * 0.5 + 0.5) * width as f32,
        (0.5 - ndc.y * 0.5) * height as f32,
        ndc.z,
    ))
}

fn blend<T>(values: [T; 3], weights: Vec3) -> T
where
    T: Mul<f32, Output = T> + Add<Output = T>,
{
    let [a, b, c] = values;
    a * weights.x + b * weights.y + c * weights.z
}

impl VertexOutput {
    /// Interpolates three vertex outputs at screen-space barycentrics `bary`.
    pub fn interpolate(vertices: &[VertexOutput; 3], bary: Vec3) -> Option<VertexOutput> {
        let weights = perspective_weights(bary, vertices.map(|v| v.clip_position.w))?;

        Some(VertexOutput {
            clip_position: blend(vertices.map(|v| v.clip_position), bary),
            frag_pos: blend(vertices.map(|v| v.frag_pos), weights),
            tex_coords: blend(vertices.map(|v| v.tex_coords), weights),
            tangent: blend(vertices.map(|v| v.tangent), weights),
            bitangent: blend(vertices.map(|v| v.bitangent), weights),
            normal: blend(vertices.map(|v| v.normal), weights),
        })
    }
}
