//! Math re-exports and bounding volumes shared by the scene and the view layer.

pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Create a box centered at position with given size
    pub fn unit_cube(center: Vec3, scale: Vec3) -> Self {
        let half = scale * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, min first
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// World-space box enclosing this box after `matrix` is applied.
    /// Conservative under rotation.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        // 8 corners, never empty
        Self::from_points(corners).unwrap_or(*self)
    }

    pub fn union(&self, other: &AABB) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Check if a point is inside the AABB
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_corners() {
        let aabb = AABB::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::ONE);
    }

    #[test]
    fn test_unit_cube() {
        let aabb = AABB::unit_cube(Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 4.0, 6.0));

        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_contains() {
        let aabb = AABB::unit_cube(Vec3::ZERO, Vec3::ONE);

        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::new(0.4, 0.4, 0.4)));
        assert!(!aabb.contains(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(AABB::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_transformed_translation_and_scale() {
        let aabb = AABB::unit_cube(Vec3::ZERO, Vec3::ONE);
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        let out = aabb.transformed(&m);
        assert_eq!(out.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(out.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_transformed_rotation_grows_box() {
        let aabb = AABB::unit_cube(Vec3::ZERO, Vec3::ONE);
        let m = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let out = aabb.transformed(&m);
        assert!(out.size().x > 1.4);
        assert!((out.size().y - 1.0).abs() < 1e-5);
    }
}
