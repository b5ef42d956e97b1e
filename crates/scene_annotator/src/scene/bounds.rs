//! Local-space bounding boxes and their world-space corners

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Point3, Transform, Vec3};

/// Axis-Aligned Bounding Box in an object's local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when `min <= max` on every axis
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// The 8 corners in local space
    ///
    /// Ordered by bit pattern: bit 0 selects max X, bit 1 max Y, bit 2 max Z.
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// The 8 corners carried into world space by `transform`
    pub fn world_corners(&self, transform: &Transform) -> [Point3; 8] {
        let matrix = transform.to_matrix();
        self.corners().map(|corner| matrix.transform_point(&corner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use std::f32::consts::PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_corners_cover_every_combination() {
        let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let corners = aabb.corners();

        assert_eq!(corners[0], Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(corners[7], Point3::new(1.0, 2.0, 3.0));
        for (i, a) in corners.iter().enumerate() {
            for b in corners.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_world_corners_follow_rotation() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(2.0, 0.5, 0.5));
        let transform = Transform::from_position_rotation(
            Vec3::new(0.0, 0.0, 1.0),
            Quat::from_axis_angle(&Vec3::z_axis(), PI / 2.0),
        );

        let world = aabb.world_corners(&transform);
        let max_y = world.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let max_x = world.iter().map(|p| p.x).fold(f32::MIN, f32::max);

        // The long X extent now lies along Y.
        assert_relative_eq!(max_y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(max_x, 0.5, epsilon = 1e-5);
        assert!(world.iter().all(|p| (p.z - 0.5).abs() < 1e-5 || (p.z - 1.5).abs() < 1e-5));
    }

    #[test]
    fn test_validity() {
        assert!(Aabb::new(Vec3::zeros(), Vec3::zeros()).is_valid());
        assert!(!Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()).is_valid());
        assert_relative_eq!(
            Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)).center(),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }
}
