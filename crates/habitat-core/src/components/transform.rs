use bytemuck::{Pod, Zeroable};

use crate::ecs::Component;
use crate::math::{EulerRot, Mat4, Quat, Vec3};

/// Placement of a module root or one of its nodes, relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Where a reset module goes back to
    pub fn identity() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY, Vec3::ONE)
    }

    /// Scene documents store rotation as XYZ Euler radians
    pub fn from_euler(position: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self::new(
            position,
            Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
            scale,
        )
    }

    /// Inverse of the rotation in `from_euler`, for the details panel
    pub fn euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Component for Transform {}

/// Per-draw uniform: model matrix and a tint multiplied into the base color
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4, tint: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint,
        }
    }
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, [1.0; 4])
    }
}
