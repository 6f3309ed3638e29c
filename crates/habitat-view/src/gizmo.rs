//! Gizmo handle hit tests and drag deltas.
//! Handles are world-axis aligned and sized in proportion to camera distance.

use glam::{Mat4, Quat, Vec3};
use serde::Serialize;

use crate::picking::Ray;
use habitat_core::math::AABB;

/// Gizmo size as a fraction of camera distance
pub const GIZMO_SCREEN_FACTOR: f32 = 0.15;

/// Axis handle pick radius, relative to gizmo size
const AXIS_PICK_RADIUS: f32 = 0.08;
/// Centre box half extent, relative to gizmo size
const CENTER_HALF: f32 = 0.12;
/// Plane handle offset from the origin and side, relative to gizmo size
pub(crate) const PLANE_OFFSET: f32 = 0.3;
pub(crate) const PLANE_SIZE: f32 = 0.25;
/// Rotation ring pick width, relative to gizmo size
const RING_PICK_WIDTH: f32 = 0.1;

/// Which transform the handles apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GizmoMode::Translate => "translate",
            GizmoMode::Rotate => "rotate",
            GizmoMode::Scale => "scale",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "translate" | "move" => Some(GizmoMode::Translate),
            "rotate" => Some(GizmoMode::Rotate),
            "scale" => Some(GizmoMode::Scale),
            _ => None,
        }
    }
}

/// Handle a drag is constrained to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GizmoAxis {
    #[default]
    None,
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
    All,
}

impl GizmoAxis {
    /// Direction of a single axis
    pub fn direction(&self) -> Option<Vec3> {
        match self {
            GizmoAxis::X => Some(Vec3::X),
            GizmoAxis::Y => Some(Vec3::Y),
            GizmoAxis::Z => Some(Vec3::Z),
            _ => None,
        }
    }

    /// 1 for constrained components, 0 elsewhere
    pub fn mask(&self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
            GizmoAxis::XY => Vec3::new(1.0, 1.0, 0.0),
            GizmoAxis::YZ => Vec3::new(0.0, 1.0, 1.0),
            GizmoAxis::XZ => Vec3::new(1.0, 0.0, 1.0),
            GizmoAxis::All => Vec3::ONE,
            GizmoAxis::None => Vec3::ZERO,
        }
    }

    /// (edge 1, edge 2, normal) of a plane handle
    pub(crate) fn plane_frame(&self) -> Option<(Vec3, Vec3, Vec3)> {
        match self {
            GizmoAxis::XY => Some((Vec3::X, Vec3::Y, Vec3::Z)),
            GizmoAxis::YZ => Some((Vec3::Y, Vec3::Z, Vec3::X)),
            GizmoAxis::XZ => Some((Vec3::X, Vec3::Z, Vec3::Y)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GizmoAxis::None => "none",
            GizmoAxis::X => "x",
            GizmoAxis::Y => "y",
            GizmoAxis::Z => "z",
            GizmoAxis::XY => "xy",
            GizmoAxis::YZ => "yz",
            GizmoAxis::XZ => "xz",
            GizmoAxis::All => "all",
        }
    }
}

impl std::str::FromStr for GizmoAxis {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "x" => GizmoAxis::X,
            "y" => GizmoAxis::Y,
            "z" => GizmoAxis::Z,
            "xy" => GizmoAxis::XY,
            "yz" => GizmoAxis::YZ,
            "xz" => GizmoAxis::XZ,
            "all" => GizmoAxis::All,
            _ => GizmoAxis::None,
        })
    }
}

/// Axis colours
pub const COLOR_X: [f32; 4] = [0.9, 0.2, 0.2, 1.0];
pub const COLOR_Y: [f32; 4] = [0.2, 0.9, 0.2, 1.0];
pub const COLOR_Z: [f32; 4] = [0.2, 0.2, 0.9, 1.0];
pub const COLOR_HIGHLIGHT: [f32; 4] = [1.0, 0.85, 0.1, 1.0];
pub const COLOR_XY: [f32; 4] = [1.0, 1.0, 0.0, 0.4];
pub const COLOR_YZ: [f32; 4] = [0.0, 1.0, 1.0, 0.4];
pub const COLOR_XZ: [f32; 4] = [1.0, 0.0, 1.0, 0.4];
pub const COLOR_ALL: [f32; 4] = [1.0, 1.0, 1.0, 0.8];

/// What the renderer and hit tests need to know about the gizmo
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoState {
    /// Active mode
    pub mode: GizmoMode,
    /// True only while a module is targeted
    pub visible: bool,
    /// Target module position
    pub position: Vec3,
    /// Handle under the pointer
    pub hovered_axis: GizmoAxis,
    /// Handle being dragged
    pub active_axis: GizmoAxis,
}

impl Default for GizmoState {
    fn default() -> Self {
        Self {
            mode: GizmoMode::Translate,
            visible: false,
            position: Vec3::ZERO,
            hovered_axis: GizmoAxis::None,
            active_axis: GizmoAxis::None,
        }
    }
}

/// Ray distance to a finite cylinder around a segment
fn ray_segment_distance(ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
    let axis = end - start;
    let length = axis.length();
    if length < 1e-6 {
        return None;
    }
    let axis_dir = axis / length;

    // solve the quadratic in the plane perpendicular to the axis
    let d = ray.direction - axis_dir * ray.direction.dot(axis_dir);
    let oc = ray.origin - start;
    let o = oc - axis_dir * oc.dot(axis_dir);

    let a = d.length_squared();
    if a < 1e-12 {
        return None;
    }
    let b = 2.0 * d.dot(o);
    let c = o.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
        .into_iter()
        .filter(|t| *t >= 0.0)
        .find(|t| {
            let along = (ray.at(*t) - start).dot(axis_dir);
            (0.0..=length).contains(&along)
        })
}

impl GizmoState {
    /// World size of the gizmo, proportional to camera distance
    pub fn gizmo_scale(&self, camera_position: Vec3) -> f32 {
        camera_position.distance(self.position) * GIZMO_SCREEN_FACTOR
    }

    /// Model matrix, scaled for camera distance
    pub fn model_matrix(&self, camera_position: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.gizmo_scale(camera_position)),
            Quat::IDENTITY,
            self.position,
        )
    }

    /// Handle colour, brightened while hovered or active
    pub fn axis_color(&self, axis: GizmoAxis) -> [f32; 4] {
        if axis != GizmoAxis::None && (self.hovered_axis == axis || self.active_axis == axis) {
            return COLOR_HIGHLIGHT;
        }
        match axis {
            GizmoAxis::X => COLOR_X,
            GizmoAxis::Y => COLOR_Y,
            GizmoAxis::Z => COLOR_Z,
            GizmoAxis::XY => COLOR_XY,
            GizmoAxis::YZ => COLOR_YZ,
            GizmoAxis::XZ => COLOR_XZ,
            GizmoAxis::All => COLOR_ALL,
            GizmoAxis::None => [0.5, 0.5, 0.5, 0.5],
        }
    }

    /// Nearest handle the ray hits
    pub fn hit_test(&self, ray: &Ray, camera_position: Vec3) -> GizmoAxis {
        if !self.visible {
            return GizmoAxis::None;
        }
        let scale = self.gizmo_scale(camera_position);
        let singles = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

        let mut hits: Vec<(GizmoAxis, f32)> = Vec::new();
        match self.mode {
            GizmoMode::Translate | GizmoMode::Scale => {
                hits.extend(self.hit_center_box(ray, scale).map(|t| (GizmoAxis::All, t)));
                hits.extend(
                    singles
                        .iter()
                        .filter_map(|&axis| self.hit_axis(ray, axis, scale).map(|t| (axis, t))),
                );
                if self.mode == GizmoMode::Translate {
                    hits.extend([GizmoAxis::XY, GizmoAxis::YZ, GizmoAxis::XZ].iter().filter_map(
                        |&axis| self.hit_plane_handle(ray, axis, scale).map(|t| (axis, t)),
                    ));
                }
            }
            GizmoMode::Rotate => {
                hits.extend(
                    singles
                        .iter()
                        .filter_map(|&axis| self.hit_ring(ray, axis, scale).map(|t| (axis, t))),
                );
            }
        }

        hits.into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(GizmoAxis::None, |(axis, _)| axis)
    }

    fn hit_axis(&self, ray: &Ray, axis: GizmoAxis, scale: f32) -> Option<f32> {
        let dir = axis.direction()?;
        ray_segment_distance(
            ray,
            self.position,
            self.position + dir * scale,
            scale * AXIS_PICK_RADIUS,
        )
    }

    fn hit_center_box(&self, ray: &Ray, scale: f32) -> Option<f32> {
        let half = Vec3::splat(scale * CENTER_HALF);
        ray.intersect_aabb(&AABB::new(self.position - half, self.position + half))
    }

    fn hit_plane_handle(&self, ray: &Ray, axis: GizmoAxis, scale: f32) -> Option<f32> {
        let (u, v, normal) = axis.plane_frame()?;
        let point = ray.intersect_plane(self.position, normal)?;
        let local = point - self.position;
        let range = (scale * PLANE_OFFSET)..=(scale * (PLANE_OFFSET + PLANE_SIZE));
        (range.contains(&local.dot(u)) && range.contains(&local.dot(v)))
            .then(|| point.distance(ray.origin))
    }

    fn hit_ring(&self, ray: &Ray, axis: GizmoAxis, scale: f32) -> Option<f32> {
        let normal = axis.direction()?;
        let point = ray.intersect_plane(self.position, normal)?;
        let radius = point.distance(self.position);
        ((radius - scale).abs() < scale * RING_PICK_WIDTH).then(|| point.distance(ray.origin))
    }

    /// Drag plane normal. A single axis uses the plane facing the eye most.
    fn drag_plane_normal(&self, axis: GizmoAxis, camera_position: Vec3) -> Vec3 {
        let view = (self.position - camera_position).normalize_or_zero();
        let pick = |a: Vec3, b: Vec3| if view.dot(a).abs() > view.dot(b).abs() { a } else { b };
        match axis {
            GizmoAxis::X => pick(Vec3::Y, Vec3::Z),
            GizmoAxis::Y => pick(Vec3::X, Vec3::Z),
            GizmoAxis::Z => pick(Vec3::X, Vec3::Y),
            GizmoAxis::XY => Vec3::Z,
            GizmoAxis::YZ => Vec3::X,
            GizmoAxis::XZ => Vec3::Y,
            GizmoAxis::All if view != Vec3::ZERO => view,
            GizmoAxis::All | GizmoAxis::None => Vec3::Y,
        }
    }

    /// Translate delta, constrained components only
    pub fn calculate_translate_drag(
        &self,
        axis: GizmoAxis,
        ray: &Ray,
        prev_ray: &Ray,
        camera_position: Vec3,
    ) -> Vec3 {
        let normal = self.drag_plane_normal(axis, camera_position);
        match (
            prev_ray.intersect_plane(self.position, normal),
            ray.intersect_plane(self.position, normal),
        ) {
            (Some(prev), Some(curr)) => (curr - prev) * axis.mask(),
            _ => Vec3::ZERO,
        }
    }

    /// Scale delta, relative to gizmo size
    pub fn calculate_scale_drag(
        &self,
        axis: GizmoAxis,
        ray: &Ray,
        prev_ray: &Ray,
        camera_position: Vec3,
    ) -> Vec3 {
        let delta = self.calculate_translate_drag(axis, ray, prev_ray, camera_position);
        let scale = self.gizmo_scale(camera_position);
        if scale <= f32::EPSILON {
            return Vec3::ZERO;
        }
        delta / scale
    }

    /// Rotate delta: the angle swept on the ring plane, about the world axis
    pub fn calculate_rotate_drag(&self, axis: GizmoAxis, ray: &Ray, prev_ray: &Ray) -> Quat {
        let Some(rotation_axis) = axis.direction() else {
            return Quat::IDENTITY;
        };
        let (Some(prev), Some(curr)) = (
            prev_ray.intersect_plane(self.position, rotation_axis),
            ray.intersect_plane(self.position, rotation_axis),
        ) else {
            return Quat::IDENTITY;
        };

        let from = (prev - self.position).normalize_or_zero();
        let to = (curr - self.position).normalize_or_zero();
        if from == Vec3::ZERO || to == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let angle = from.dot(to).clamp(-1.0, 1.0).acos();
        let sign = if from.cross(to).dot(rotation_axis) >= 0.0 { 1.0 } else { -1.0 };
        Quat::from_axis_angle(rotation_axis, angle * sign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_at_origin(mode: GizmoMode) -> GizmoState {
        GizmoState {
            mode,
            visible: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_gizmo_axis_from_str() {
        assert_eq!("x".parse::<GizmoAxis>().unwrap(), GizmoAxis::X);
        assert_eq!("Y".parse::<GizmoAxis>().unwrap(), GizmoAxis::Y);
        assert_eq!("xy".parse::<GizmoAxis>().unwrap(), GizmoAxis::XY);
        assert_eq!("invalid".parse::<GizmoAxis>().unwrap(), GizmoAxis::None);
    }

    #[test]
    fn test_mode_names() {
        for mode in [GizmoMode::Translate, GizmoMode::Rotate, GizmoMode::Scale] {
            assert_eq!(GizmoMode::from_name(mode.as_str()), Some(mode));
        }
        assert_eq!(GizmoMode::from_name("Move"), Some(GizmoMode::Translate));
        assert_eq!(GizmoMode::from_name("shear"), None);
    }

    #[test]
    fn test_scale_follows_camera_distance() {
        let state = visible_at_origin(GizmoMode::Translate);
        assert!((state.gizmo_scale(Vec3::new(0.0, 0.0, 10.0)) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_hidden_gizmo_never_hits() {
        let state = GizmoState::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(state.hit_test(&ray, ray.origin), GizmoAxis::None);
    }

    #[test]
    fn test_hit_center_box() {
        let state = visible_at_origin(GizmoMode::Translate);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(state.hit_test(&ray, ray.origin), GizmoAxis::All);
    }

    #[test]
    fn test_hit_x_axis() {
        let state = visible_at_origin(GizmoMode::Translate);
        let camera = Vec3::new(0.0, 0.0, 10.0);
        // gizmo scale 1.5, aim at the middle of the X handle
        let ray = Ray::new(camera, Vec3::new(1.0, 0.0, 0.0) - camera);
        assert_eq!(state.hit_test(&ray, camera), GizmoAxis::X);
    }

    #[test]
    fn test_hit_rotate_ring() {
        let state = visible_at_origin(GizmoMode::Rotate);
        let camera = Vec3::new(0.0, 0.0, 10.0);
        // Z ring faces the camera; its radius equals the gizmo scale
        let ray = Ray::new(camera, Vec3::new(1.5, 0.0, 0.0) - camera);
        assert_eq!(state.hit_test(&ray, camera), GizmoAxis::Z);
    }

    #[test]
    fn test_translate_drag_is_axis_constrained() {
        let state = visible_at_origin(GizmoMode::Translate);
        let camera = Vec3::new(0.0, 0.0, 10.0);
        let prev = Ray::new(camera, Vec3::new(0.0, 0.0, 0.0) - camera);
        let curr = Ray::new(camera, Vec3::new(1.0, 1.0, 0.0) - camera);

        let delta = state.calculate_translate_drag(GizmoAxis::X, &curr, &prev, camera);
        assert!(delta.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-4));

        let delta = state.calculate_translate_drag(GizmoAxis::XY, &curr, &prev, camera);
        assert!(delta.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-4));
    }

    #[test]
    fn test_rotate_drag_quarter_turn() {
        let state = visible_at_origin(GizmoMode::Rotate);
        let camera = Vec3::new(0.0, 0.0, 10.0);
        let prev = Ray::new(camera, Vec3::new(1.0, 0.0, 0.0) - camera);
        let curr = Ray::new(camera, Vec3::new(0.0, 1.0, 0.0) - camera);

        let q = state.calculate_rotate_drag(GizmoAxis::Z, &curr, &prev);
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        assert!(q.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_axis_color_highlight() {
        let mut state = visible_at_origin(GizmoMode::Translate);
        assert_eq!(state.axis_color(GizmoAxis::X), COLOR_X);
        state.active_axis = GizmoAxis::X;
        assert_eq!(state.axis_color(GizmoAxis::X), COLOR_HIGHLIGHT);
        assert_eq!(state.axis_color(GizmoAxis::Y), COLOR_Y);
    }
}
