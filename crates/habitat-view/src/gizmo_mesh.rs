//! Gizmo handle geometry, built at unit size and scaled by
//! `GizmoState::model_matrix` when drawn.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::gizmo::{GizmoAxis, GizmoMode, GizmoState, PLANE_OFFSET, PLANE_SIZE};

/// Gizmo vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GizmoVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl GizmoVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    /// Vertex buffer layout
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GizmoVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Push a quad as two triangles
fn push_quad(out: &mut Vec<GizmoVertex>, corners: [Vec3; 4], color: [f32; 4]) {
    for i in [0, 1, 2, 0, 2, 3] {
        out.push(GizmoVertex::new(corners[i], color));
    }
}

/// Square prism from `from` to `to` (four sides)
fn push_shaft(out: &mut Vec<GizmoVertex>, from: Vec3, to: Vec3, half: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    let side = dir.any_orthonormal_vector();
    let other = dir.cross(side);
    let ring = [
        side + other,
        -side + other,
        -side - other,
        side - other,
    ]
    .map(|v| v * half);
    for i in 0..4 {
        let (a, b) = (ring[i], ring[(i + 1) % 4]);
        push_quad(out, [from + a, from + b, to + b, to + a], color);
    }
}

/// Cube at `center` with half extent `half`
fn push_cube(out: &mut Vec<GizmoVertex>, center: Vec3, half: f32, color: [f32; 4]) {
    let c = |x: f32, y: f32, z: f32| center + Vec3::new(x, y, z) * half;
    let faces = [
        [c(-1., -1., -1.), c(1., -1., -1.), c(1., 1., -1.), c(-1., 1., -1.)],
        [c(1., -1., 1.), c(-1., -1., 1.), c(-1., 1., 1.), c(1., 1., 1.)],
        [c(-1., -1., 1.), c(-1., -1., -1.), c(-1., 1., -1.), c(-1., 1., 1.)],
        [c(1., -1., -1.), c(1., -1., 1.), c(1., 1., 1.), c(1., 1., -1.)],
        [c(-1., 1., -1.), c(1., 1., -1.), c(1., 1., 1.), c(-1., 1., 1.)],
        [c(-1., -1., 1.), c(1., -1., 1.), c(1., -1., -1.), c(-1., -1., -1.)],
    ];
    for face in faces {
        push_quad(out, face, color);
    }
}

/// Translate arrow: shaft plus cone
pub fn create_arrow_vertices(axis: GizmoAxis, color: [f32; 4]) -> Vec<GizmoVertex> {
    let mut out = Vec::new();
    let Some(dir) = axis.direction() else {
        return out;
    };
    let cone_length = 0.2;
    let cone_radius = 0.06;
    let base = dir * (1.0 - cone_length);
    push_shaft(&mut out, Vec3::ZERO, base, 0.02, color);

    let side = dir.any_orthonormal_vector();
    let other = dir.cross(side);
    let rim = |i: u32| {
        let angle = i as f32 / 8.0 * TAU;
        base + (side * angle.cos() + other * angle.sin()) * cone_radius
    };
    for i in 0..8 {
        let (p1, p2) = (rim(i), rim(i + 1));
        out.extend([p1, p2, dir].map(|p| GizmoVertex::new(p, color)));
        out.extend([base, p2, p1].map(|p| GizmoVertex::new(p, color)));
    }
    out
}

/// Plane handle, both faces
pub fn create_plane_vertices(axis: GizmoAxis, color: [f32; 4]) -> Vec<GizmoVertex> {
    let mut out = Vec::new();
    let Some((u, v, _)) = axis.plane_frame() else {
        return out;
    };
    let (lo, hi) = (PLANE_OFFSET, PLANE_OFFSET + PLANE_SIZE);
    let quad = [u * lo + v * lo, u * hi + v * lo, u * hi + v * hi, u * lo + v * hi];
    push_quad(&mut out, quad, color);
    push_quad(&mut out, [quad[0], quad[3], quad[2], quad[1]], color);
    out
}

/// Rotate ring: band of radius 1
pub fn create_circle_vertices(axis: GizmoAxis, color: [f32; 4]) -> Vec<GizmoVertex> {
    let mut out = Vec::new();
    let Some(normal) = axis.direction() else {
        return out;
    };
    let side = normal.any_orthonormal_vector();
    let other = normal.cross(side);
    let thickness = 0.03;
    let point = |i: u32| {
        let angle = i as f32 / 32.0 * TAU;
        side * angle.cos() + other * angle.sin()
    };
    for i in 0..32 {
        let (p1, p2) = (point(i), point(i + 1));
        push_quad(
            &mut out,
            [
                p1 * (1.0 - thickness),
                p1 * (1.0 + thickness),
                p2 * (1.0 + thickness),
                p2 * (1.0 - thickness),
            ],
            color,
        );
    }
    out
}

/// Scale shaft tipped with a box
pub fn create_scale_axis_vertices(axis: GizmoAxis, color: [f32; 4]) -> Vec<GizmoVertex> {
    let mut out = Vec::new();
    let Some(dir) = axis.direction() else {
        return out;
    };
    let length = 0.85;
    let box_half = 0.05;
    push_shaft(&mut out, Vec3::ZERO, dir * length, 0.02, color);
    push_cube(&mut out, dir * (length + box_half), box_half, color);
    out
}

/// Centre handle for all axes
pub fn create_center_box_vertices(color: [f32; 4]) -> Vec<GizmoVertex> {
    let mut out = Vec::new();
    push_cube(&mut out, Vec3::ZERO, 0.1, color);
    out
}

/// Every handle of the active mode, coloured for hover and drag
pub fn build_gizmo_vertices(state: &GizmoState) -> Vec<GizmoVertex> {
    let singles = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];
    let mut out = Vec::new();
    match state.mode {
        GizmoMode::Translate => {
            for axis in singles {
                out.extend(create_arrow_vertices(axis, state.axis_color(axis)));
            }
            for axis in [GizmoAxis::XY, GizmoAxis::YZ, GizmoAxis::XZ] {
                out.extend(create_plane_vertices(axis, state.axis_color(axis)));
            }
            out.extend(create_center_box_vertices(state.axis_color(GizmoAxis::All)));
        }
        GizmoMode::Rotate => {
            for axis in singles {
                out.extend(create_circle_vertices(axis, state.axis_color(axis)));
            }
        }
        GizmoMode::Scale => {
            for axis in singles {
                out.extend(create_scale_axis_vertices(axis, state.axis_color(axis)));
            }
            out.extend(create_center_box_vertices(state.axis_color(GizmoAxis::All)));
        }
    }
    out
}
