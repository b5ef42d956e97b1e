//! # Camera System
//!
//! Pinhole camera described the way render tools describe physical cameras:
//! a focal length and a sensor width in millimetres, plus the render
//! resolution. The camera looks down its local -Z axis with local +Y as up.
//!
//! [`Camera`] is the mutable scene-side object; [`CameraModel`] is the
//! read-only snapshot the projector borrows for each configuration.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Quat, Unit, Vec3};

/// Default full-frame sensor width in millimetres
pub const DEFAULT_SENSOR_WIDTH_MM: f32 = 36.0;

/// Render resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Create a resolution
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square resolution
    pub const fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Width as `f64`
    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`
    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }

    /// True when neither dimension is zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::square(640)
    }
}

/// Read-only view of the camera state needed for projection
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    /// World-to-camera (view) transform
    pub world_to_camera: Mat4,
    /// Render resolution
    pub resolution: Resolution,
    /// Focal length in millimetres
    pub lens_mm: f32,
    /// Sensor width in millimetres
    pub sensor_width_mm: f32,
}

impl CameraModel {
    /// Half-extents of the view frame at unit depth, `(half_w, half_h)`
    ///
    /// The sensor spans the larger image dimension; the other one is scaled
    /// by the aspect ratio.
    pub fn frame_half_extents(&self) -> (f32, f32) {
        let half = self.sensor_width_mm / (2.0 * self.lens_mm);
        let width = self.resolution.width as f32;
        let height = self.resolution.height as f32;
        if width >= height {
            (half, half * height / width)
        } else {
            (half * width / height, half)
        }
    }
}

/// Perspective camera positioned in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation
    pub up: Vec3,

    /// Focal length in millimetres
    pub lens_mm: f32,

    /// Sensor width in millimetres
    pub sensor_width_mm: f32,

    /// Render resolution in pixels
    pub resolution: Resolution,
}

impl Camera {
    /// Create a camera at `position` looking at `target` with +Y up
    pub fn new(position: Vec3, target: Vec3, lens_mm: f32, resolution: Resolution) -> Self {
        Self {
            position,
            target,
            up: Vec3::new(0.0, 1.0, 0.0),
            lens_mm,
            sensor_width_mm: DEFAULT_SENSOR_WIDTH_MM,
            resolution,
        }
    }

    /// Move the camera, keeping its target
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera moved to {:?}", position);
    }

    /// Aim at `target` with `up` as the image's upward direction
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera aimed at {:?} (up {:?})", target, up);
    }

    /// Change the focal length
    pub fn set_lens(&mut self, lens_mm: f32) {
        if (self.lens_mm - lens_mm).abs() > f32::EPSILON {
            log::debug!("Camera lens changed: {:.1}mm -> {:.1}mm", self.lens_mm, lens_mm);
        }
        self.lens_mm = lens_mm;
    }

    /// World-to-camera matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Snapshot the state the projector needs
    pub fn model(&self) -> CameraModel {
        CameraModel {
            world_to_camera: self.view_matrix(),
            resolution: self.resolution,
            lens_mm: self.lens_mm,
            sensor_width_mm: self.sensor_width_mm,
        }
    }
}

impl Default for Camera {
    /// Camera 2 units above the origin looking straight down, 35mm lens, 640x640
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 2.0), Vec3::zeros(), 35.0, Resolution::default())
    }
}

/// Ring the camera is parented to
///
/// Rotating the ring by an angle about `axis` swings the camera around
/// `pivot`; the camera keeps tracking the pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitRig {
    /// Center the camera orbits and looks at
    pub pivot: Vec3,
    /// Camera position relative to the pivot at angle zero
    pub offset: Vec3,
    /// Axis the ring rotates about
    pub axis: Vec3,
    /// Camera up vector at angle zero
    pub up: Vec3,
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self {
            pivot: Vec3::zeros(),
            offset: Vec3::new(0.0, 0.0, 2.0),
            axis: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl OrbitRig {
    fn rotation(&self, angle_degrees: f32) -> Quat {
        Unit::try_new(self.axis, 1e-6).map_or_else(
            || {
                log::warn!("Orbit axis {:?} is degenerate; ignoring orbit angle", self.axis);
                Quat::identity()
            },
            |axis| Quat::from_axis_angle(&axis, utils::deg_to_rad(angle_degrees)),
        )
    }

    /// Place `camera` on the ring at `angle_degrees`, tracking the pivot
    pub fn place(&self, camera: &mut Camera, angle_degrees: f32) {
        let rotation = self.rotation(angle_degrees);
        camera.set_position(self.pivot + rotation * self.offset);
        camera.look_at(self.pivot, rotation * self.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_half_extents_follow_larger_dimension() {
        let mut model = Camera::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), 18.0, Resolution::new(800, 400)).model();
        assert_eq!(model.frame_half_extents(), (1.0, 0.5));

        model.resolution = Resolution::new(400, 800);
        assert_eq!(model.frame_half_extents(), (0.5, 1.0));
    }

    #[test]
    fn test_orbit_keeps_distance_and_tracks_pivot() {
        let rig = OrbitRig::default();
        let mut camera = Camera::default();

        rig.place(&mut camera, -65.0);
        assert_relative_eq!((camera.position - rig.pivot).norm(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.target, rig.pivot);

        // The pivot stays on the optical axis.
        let pivot_in_view = camera.view_matrix().transform_point(&Point3::from(rig.pivot));
        assert_relative_eq!(pivot_in_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pivot_in_view.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pivot_in_view.z, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_quarter_turn_about_x() {
        let rig = OrbitRig::default();
        let mut camera = Camera::default();

        rig.place(&mut camera, 90.0);
        assert_relative_eq!(camera.position, Vec3::new(0.0, -2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.up, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }
}
