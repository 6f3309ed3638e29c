use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::picking::Ray;

/// Pitch limit that keeps the view from flipping at the poles
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera uniform for the GPU.
/// View-projection matrix and camera position (for lighting), column-major.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl CameraUniform {
    /// Build from a view-projection matrix
    pub fn from_mat4(mat: Mat4, eye: Vec3) -> Self {
        Self {
            view_proj: mat.to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::from_mat4(Mat4::IDENTITY, Vec3::ZERO)
    }
}

/// Perspective camera with position, target and up vector
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera with default placement
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 50.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// View-projection matrix
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Uniform for the GPU
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::from_mat4(self.build_view_projection_matrix(), self.position)
    }

    /// Distance to the target
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Normalized view direction; zero when position and target coincide
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Camera orientation; local -Z looks along the view direction
    pub fn orientation(&self) -> Quat {
        if self.forward() == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let (_, rotation, _) = self.view_matrix().inverse().to_scale_rotation_translation();
        rotation.normalize()
    }

    /// World-space ray through NDC (x, y in [-1, 1], y up)
    pub fn screen_to_ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.build_view_projection_matrix().inverse();
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(self.position, far - self.position)
    }

    /// Project a world point to NDC
    pub fn world_to_ndc(&self, point: Vec3) -> Vec3 {
        self.build_view_projection_matrix().project_point3(point)
    }

    /// Orbit around the target in spherical coordinates (radians)
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let yaw = offset.x.atan2(offset.z) - delta_yaw;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + delta_pitch)
            .clamp(-MAX_PITCH, MAX_PITCH);

        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();
        self.position =
            self.target + Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * radius;
    }

    /// Slide position and target along the screen plane, scaled by distance
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize_or_zero();
        let screen_up = right.cross(forward);
        let delta = (right * -dx + screen_up * -dy) * self.distance();
        self.position += delta;
        self.target += delta;
    }

    /// Set the distance to the target, clamped to the range
    pub fn set_distance(&mut self, distance: f32, min: f32, max: f32) {
        let forward = self.forward();
        if forward == Vec3::ZERO {
            return;
        }
        self.position = self.target - forward * distance.clamp(min, max);
    }

    /// Set the position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Set the target
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Set the aspect ratio
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}
