//! Picking system for ray-AABB intersection
//!
//! Turns a pointer position into the nearest interactive module under it.

use glam::{Vec2, Vec3};
use habitat_core::EntityId;
use habitat_core::math::AABB;

use crate::camera::Camera;

/// Ray for raycasting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Check intersection with AABB using slab method
    /// Returns the distance to intersection point if hit, None otherwise
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        // Handle division by zero with small epsilon
        let inv = |d: f32| if d.abs() > f32::EPSILON { 1.0 / d } else { f32::MAX };
        let inv_dir = Vec3::new(inv(self.direction.x), inv(self.direction.y), inv(self.direction.z));

        let t1 = (aabb.min - self.origin) * inv_dir;
        let t2 = (aabb.max - self.origin) * inv_dir;

        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }

    /// Intersection with the plane through `point` with `normal`
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<Vec3> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then(|| self.at(t))
    }
}

/// One ray-castable primitive, bounds already in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub primitive: EntityId,
    pub owner: EntityId,
    pub bounds: AABB,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub primitive: EntityId,
    pub owner: EntityId,
    pub distance: f32,
}

/// Nearest candidate under the pointer.
/// Equal distances keep the earlier candidate; an empty set never hits.
pub fn pick(ndc: Vec2, camera: &Camera, candidates: &[Candidate]) -> Option<Hit> {
    let ray = camera.screen_to_ray(ndc);
    let mut best: Option<Hit> = None;
    for candidate in candidates {
        let Some(distance) = ray.intersect_aabb(&candidate.bounds) else {
            continue;
        };
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Hit {
                primitive: candidate.primitive,
                owner: candidate.owner,
                distance,
            });
        }
    }
    best
}
