//! 3D corner sets to 2D pixel rectangles
//!
//! Points are carried into view space with the camera's world-to-camera
//! matrix and divided by their depth along the viewing axis. Normalized frame
//! coordinates run from `0` to `1` across the frame with the origin at the
//! bottom-left; pixel coordinates keep that origin.

use crate::foundation::math::Point3;
use crate::scene::CameraModel;

/// A point in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Horizontal position, `0` at the left edge and `1` at the right
    pub x: f64,
    /// Vertical position, `0` at the bottom edge and `1` at the top
    pub y: f64,
    /// Distance along the viewing axis; negative behind the camera
    pub depth: f64,
}

/// Axis-aligned rectangle in pixels, Y measured from the bottom edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedRect {
    /// Left edge
    pub min_x: f64,
    /// Bottom edge
    pub min_y: f64,
    /// Right edge
    pub max_x: f64,
    /// Top edge
    pub max_y: f64,
}

impl ProjectedRect {
    /// Rectangle from two edges per axis
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Width in pixels
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in pixels
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center in pixels
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }
}

/// Projection errors
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    /// No corners were supplied
    #[error("Cannot project an empty corner set")]
    Empty,
}

/// Project every corner into normalized frame coordinates
///
/// Corners exactly on the camera plane map to the frame center.
pub fn project_points(camera: &CameraModel, corners: &[Point3]) -> Vec<ProjectedPoint> {
    let (half_w, half_h) = camera.frame_half_extents();
    let (half_w, half_h) = (f64::from(half_w), f64::from(half_h));

    corners
        .iter()
        .map(|corner| {
            let view = camera.world_to_camera.transform_point(corner);
            let depth = -f64::from(view.z);
            if depth == 0.0 {
                return ProjectedPoint { x: 0.5, y: 0.5, depth };
            }
            ProjectedPoint {
                x: (f64::from(view.x) / depth) / (2.0 * half_w) + 0.5,
                y: (f64::from(view.y) / depth) / (2.0 * half_h) + 0.5,
                depth,
            }
        })
        .collect()
}

/// Tightest pixel rectangle enclosing every projected corner
///
/// Pass the concatenated corners of several objects to box them jointly.
pub fn project(camera: &CameraModel, corners: &[Point3]) -> Result<ProjectedRect, ProjectionError> {
    if corners.is_empty() {
        return Err(ProjectionError::Empty);
    }

    let width = camera.resolution.width_f64();
    let height = camera.resolution.height_f64();
    let points = project_points(camera, corners);

    if points.iter().any(|point| point.depth < 0.0) {
        log::trace!("Projecting {} corners with some behind the camera", points.len());
    }

    let rect = points.iter().fold(
        ProjectedRect::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |rect, point| {
            let (x, y) = (point.x * width, point.y * height);
            ProjectedRect::new(
                rect.min_x.min(x),
                rect.min_y.min(y),
                rect.max_x.max(x),
                rect.max_y.max(y),
            )
        },
    );
    Ok(rect)
}
