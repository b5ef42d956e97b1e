//! Math utilities and types
//!
//! Provides the `f32` linear algebra aliases used by the scene, projector and
//! sweep code. World space is right-handed with Z up; cameras look down their
//! local -Z axis.

pub use nalgebra::Unit;

/// World-space vector
pub type Vec3 = nalgebra::Vector3<f32>;

/// Homogeneous 4x4 transform
pub type Mat4 = nalgebra::Matrix4<f32>;

/// World- or view-space point
pub type Point3 = nalgebra::Point3<f32>;

/// Unit quaternion rotation
pub type Quat = nalgebra::UnitQuaternion<f32>;

/// Object placement, applied to local points as scale, then rotation, then translation
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation in world units
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position_rotation(Vec3::zeros(), Quat::identity())
    }
}

impl Transform {
    /// No translation, rotation or scaling
    pub fn identity() -> Self {
        Self::default()
    }

    /// Translation only
    pub fn from_position(position: Vec3) -> Self {
        Self::from_position_rotation(position, Quat::identity())
    }

    /// Translation and rotation at unit scale
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::repeat(1.0),
        }
    }

    /// Replace the scale
    #[must_use]
    pub fn with_scale(self, scale: Vec3) -> Self {
        Self { scale, ..self }
    }

    /// Local-to-world matrix, `T * R * S`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Map a local point to world space
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        Point3::from(self.position + self.rotation * point.coords.component_mul(&self.scale))
    }
}

/// Angle and vector helpers
pub mod utils {
    use super::{Quat, Vec3};

    /// Degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Build a rotation from XYZ Euler angles given in degrees
    ///
    /// Angles are applied about the fixed world axes in X, then Y, then Z
    /// order, so the resulting rotation is `Rz * Ry * Rx`.
    pub fn euler_xyz_degrees(angles: Vec3) -> Quat {
        let rx = Quat::from_axis_angle(&Vec3::x_axis(), deg_to_rad(angles.x));
        let ry = Quat::from_axis_angle(&Vec3::y_axis(), deg_to_rad(angles.y));
        let rz = Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(angles.z));
        rz * ry * rx
    }

    /// True when every component is finite
    pub fn is_finite_vec3(v: &Vec3) -> bool {
        v.iter().all(|c| c.is_finite())
    }
}

/// View-matrix construction on [`Mat4`]
pub trait Mat4Ext {
    /// World-to-camera matrix for a camera at `eye` looking at `target`
    ///
    /// The camera looks down its local -Z axis with local +Y as up.
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_look_at_maps_target_onto_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));

        let target_in_view = view.transform_point(&Point3::origin());
        assert_relative_eq!(target_in_view, Point3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_preserves_right_and_up() {
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0));

        let right = view.transform_point(&Point3::new(1.0, 0.0, 0.0));
        let up = view.transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(right, Point3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(up, Point3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_euler_xyz_applies_z_last() {
        // Rotating +X by 90 degrees about Y gives -Z; the Z rotation leaves it there.
        let rotation = utils::euler_xyz_degrees(Vec3::new(0.0, 90.0, 45.0));
        let rotated = rotation * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_point_applies_scale_rotation_translation() {
        let transform = Transform::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2),
        )
        .with_scale(Vec3::new(2.0, 2.0, 2.0));

        let moved = transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Point3::new(1.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_point_agrees_with_matrix() {
        let transform = Transform::from_position_rotation(
            Vec3::new(0.5, -1.0, 2.0),
            utils::euler_xyz_degrees(Vec3::new(10.0, 90.0, 30.0)),
        )
        .with_scale(Vec3::new(1.0, 0.5, 3.0));

        let point = Point3::new(0.2, -0.4, 1.5);
        assert_relative_eq!(
            transform.transform_point(&point),
            transform.to_matrix().transform_point(&point),
            epsilon = EPSILON
        );
    }
}
