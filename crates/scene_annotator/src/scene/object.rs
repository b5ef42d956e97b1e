//! Annotated scene objects

use crate::foundation::math::{utils, Point3, Quat, Transform, Vec3};
use crate::scene::bounds::Aabb;

/// An object whose bounds are projected into annotations
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Unique name used by annotation targets
    pub name: String,
    /// Local-space bounds
    pub bounds: Aabb,
    /// Placement before any sweep mutation
    pub base: Transform,
    /// Spin about world Z applied on top of the base rotation, in degrees
    pub spin_degrees: f32,
    /// Signed rotation about the object's own Z axis, in degrees
    pub hinge_degrees: f32,
    /// Negate the local Z scale
    pub mirrored: bool,
    /// Positional offset added to the base position
    pub jitter_offset: Vec3,
    /// Material currently assigned, if the scene tracks one
    pub material: Option<String>,
}

impl SceneObject {
    /// Create an object at `base` with no spin, hinge, offset, or material
    pub fn new(name: impl Into<String>, bounds: Aabb, base: Transform) -> Self {
        Self {
            name: name.into(),
            bounds,
            base,
            spin_degrees: 0.0,
            hinge_degrees: 0.0,
            mirrored: false,
            jitter_offset: Vec3::zeros(),
            material: None,
        }
    }

    /// Current world transform including spin, hinge, mirror and jitter
    pub fn world_transform(&self) -> Transform {
        let spin = Quat::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(self.spin_degrees));
        let hinge = Quat::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(self.hinge_degrees));
        let mut scale = self.base.scale;
        if self.mirrored {
            scale.z = -scale.z;
        }
        Transform {
            position: self.base.position + self.jitter_offset,
            rotation: spin * self.base.rotation * hinge,
            scale,
        }
    }

    /// World-space corners of the bounds at the current transform
    pub fn world_corners(&self) -> [Point3; 8] {
        self.bounds.world_corners(&self.world_transform())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cable() -> SceneObject {
        SceneObject::new(
            "cable",
            Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 0.25, 0.1)),
            Transform::from_position(Vec3::new(0.0, 0.0, 0.5)),
        )
    }

    #[test]
    fn test_untouched_object_uses_base_transform() {
        let object = cable();
        assert_eq!(object.world_transform(), object.base);
    }

    #[test]
    fn test_spin_rotates_about_world_z() {
        let mut object = cable();
        object.spin_degrees = 90.0;

        let corners = object.world_corners();
        let max_x = corners.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let max_y = corners.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_x, 0.25, epsilon = 1e-5);
        assert_relative_eq!(max_y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hinge_turns_about_local_z() {
        // Standing on end: local Z points along world X.
        let mut object = SceneObject::new(
            "blade",
            Aabb::new(Vec3::zeros(), Vec3::new(0.1, 0.0, 1.0)),
            Transform::from_position_rotation(Vec3::zeros(), utils::euler_xyz_degrees(Vec3::new(0.0, 90.0, 0.0))),
        );
        let before = object.world_corners();
        object.hinge_degrees = 90.0;
        let after = object.world_corners();

        // The long edge stays on world X; the short edge swings from -Z to Y.
        let max_x = after.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let max_y = after.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(max_y, 0.1, epsilon = 1e-5);
        assert!(before.iter().all(|p| p.y.abs() < 1e-5));
    }

    #[test]
    fn test_mirror_negates_local_z() {
        let mut object = SceneObject::new(
            "blade",
            Aabb::new(Vec3::zeros(), Vec3::new(1.0, 0.1, 0.2)),
            Transform::from_position(Vec3::new(0.0, 0.0, 0.5)),
        );
        object.mirrored = true;

        assert_relative_eq!(object.world_transform().scale, Vec3::new(1.0, 1.0, -1.0));
        let min_z = object.world_corners().iter().map(|p| p.z).fold(f32::MAX, f32::min);
        assert_relative_eq!(min_z, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_jitter_offsets_position() {
        let mut object = cable();
        object.jitter_offset = Vec3::new(0.1, -0.2, 0.0);
        assert_relative_eq!(
            object.world_transform().position,
            Vec3::new(0.1, -0.2, 0.5),
            epsilon = 1e-6
        );
    }
}
