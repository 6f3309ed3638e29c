//! Proxy geometry: every module primitive is drawn as its bounding box.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use habitat_core::math::AABB;
use wgpu::{BufferAddress, VertexBufferLayout, VertexStepMode};

/// Position and normal. Colour comes from the per-instance uniform.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    /// Vertex buffer layout
    pub fn desc() -> VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Unit cube centred on the origin, with per-face normals
    pub fn cube() -> Self {
        let mut mesh = Self::default();
        for normal in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            let u = normal.any_orthonormal_vector();
            let v = normal.cross(u);
            mesh.push_quad(
                [
                    (normal - u - v) * 0.5,
                    (normal + u - v) * 0.5,
                    (normal + u + v) * 0.5,
                    (normal - u + v) * 0.5,
                ],
                normal,
            );
        }
        mesh
    }

    /// Square floor on y = 0 with side `size`
    pub fn ground(size: f32) -> Self {
        let h = size * 0.5;
        let mut mesh = Self::default();
        mesh.push_quad(
            [
                Vec3::new(-h, 0.0, h),
                Vec3::new(h, 0.0, h),
                Vec3::new(h, 0.0, -h),
                Vec3::new(-h, 0.0, -h),
            ],
            Vec3::Y,
        );
        mesh
    }

    /// Append a counter-clockwise quad
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.map(|c| Vertex::new(c, normal)));
        // counter-clockwise as seen from the normal side
        let winding = (corners[1] - corners[0]).cross(corners[2] - corners[0]).dot(normal);
        if winding >= 0.0 {
            self.indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        } else {
            self.indices.extend([base, base + 2, base + 1, base, base + 3, base + 2]);
        }
    }

    /// Vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Index count
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Unit cube fitted to `bounds`, then placed by the node's world matrix
pub fn proxy_model_matrix(bounds: &AABB, node_world: Mat4) -> Mat4 {
    let size = bounds.size().max(Vec3::splat(1e-3));
    node_world * Mat4::from_scale_rotation_translation(size, glam::Quat::IDENTITY, bounds.center())
}

/// Display colour per module type; a type always gets the same colour
pub fn proxy_color(module_type: &str) -> [f32; 4] {
    const PALETTE: [[f32; 4]; 6] = [
        [0.75, 0.78, 0.82, 1.0],
        [0.55, 0.70, 0.90, 1.0],
        [0.60, 0.85, 0.60, 1.0],
        [0.95, 0.75, 0.45, 1.0],
        [0.80, 0.60, 0.85, 1.0],
        [0.90, 0.55, 0.55, 1.0],
    ];
    let hash = module_type
        .to_ascii_lowercase()
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
    PALETTE[hash as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        // 2 attributes * 3 floats * 4 bytes
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| (c.abs() - 0.5).abs() < 1e-5)));
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = Mesh::cube();
        for tri in cube.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(cube.vertices[i as usize].position));
            let normal = Vec3::from(cube.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_proxy_matrix_covers_bounds() {
        let bounds = AABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 4.0));
        let m = proxy_model_matrix(&bounds, Mat4::IDENTITY);
        let corners = AABB::unit_cube(Vec3::ZERO, Vec3::ONE).transformed(&m);
        assert!(corners.min.abs_diff_eq(bounds.min, 1e-5));
        assert!(corners.max.abs_diff_eq(bounds.max, 1e-5));
    }

    #[test]
    fn test_proxy_color_is_stable() {
        assert_eq!(proxy_color("Laboratory"), proxy_color("laboratory"));
    }
}
