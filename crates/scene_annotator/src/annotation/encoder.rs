//! Pixel rectangles to normalized detection annotations

use serde::{Deserialize, Serialize};

use crate::annotation::ProjectedRect;
use crate::scene::Resolution;

/// Which image edge the Y axis of the annotation is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YOrigin {
    /// Y grows downward from the top edge (detection label convention)
    #[default]
    Top,
    /// Y grows upward from the bottom edge (render convention)
    Bottom,
}

/// A box in normalized center/size form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAnnotation {
    /// Class index
    pub class_id: u32,
    /// Center X as a fraction of the image width
    pub x_center: f64,
    /// Center Y as a fraction of the image height
    pub y_center: f64,
    /// Width as a fraction of the image width
    pub width: f64,
    /// Height as a fraction of the image height
    pub height: f64,
}

impl NormalizedAnnotation {
    /// Back to a pixel rectangle measured from the bottom edge
    pub fn to_pixel_rect(&self, resolution: Resolution, y_origin: YOrigin) -> ProjectedRect {
        let (w, h) = (resolution.width_f64(), resolution.height_f64());
        let cx = self.x_center * w;
        let cy = match y_origin {
            YOrigin::Top => h - self.y_center * h,
            YOrigin::Bottom => self.y_center * h,
        };
        let (half_w, half_h) = (self.width * w * 0.5, self.height * h * 0.5);
        ProjectedRect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Pixel rectangle with Y measured from the top edge, as image buffers use
    pub fn to_image_rect(&self, resolution: Resolution) -> ProjectedRect {
        let (w, h) = (resolution.width_f64(), resolution.height_f64());
        let (cx, cy) = (self.x_center * w, self.y_center * h);
        let (half_w, half_h) = (self.width * w * 0.5, self.height * h * 0.5);
        ProjectedRect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }
}

/// Result of encoding one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodeOutcome {
    /// Center inside the frame
    Accepted(NormalizedAnnotation),
    /// Center outside the frame; nothing is written for this object
    Rejected {
        /// Class index
        class_id: u32,
        /// Normalized center X that failed the check
        x_center: f64,
        /// Normalized center Y that failed the check
        y_center: f64,
    },
}

impl EncodeOutcome {
    /// The annotation, if accepted
    pub fn accepted(&self) -> Option<&NormalizedAnnotation> {
        match self {
            Self::Accepted(annotation) => Some(annotation),
            Self::Rejected { .. } => None,
        }
    }

    /// True when rejected
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Normalize a pixel rectangle into a detection annotation
///
/// Only the center is range-checked, bounds inclusive; a box hanging over the
/// frame edge keeps its full size.
pub fn encode(rect: &ProjectedRect, resolution: Resolution, class_id: u32, y_origin: YOrigin) -> EncodeOutcome {
    let (w, h) = (resolution.width_f64(), resolution.height_f64());
    let (cx, cy) = rect.center();
    let cy = match y_origin {
        YOrigin::Top => h - cy,
        YOrigin::Bottom => cy,
    };

    let x_center = cx / w;
    let y_center = cy / h;

    // NaN fails the range check as well.
    if !(in_unit_range(x_center) && in_unit_range(y_center)) {
        return EncodeOutcome::Rejected { class_id, x_center, y_center };
    }

    EncodeOutcome::Accepted(NormalizedAnnotation {
        class_id,
        x_center,
        y_center,
        width: rect.width() / w,
        height: rect.height() / h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RES: Resolution = Resolution::square(640);

    fn accepted(outcome: EncodeOutcome) -> NormalizedAnnotation {
        match outcome {
            EncodeOutcome::Accepted(annotation) => annotation,
            EncodeOutcome::Rejected { .. } => panic!("expected an accepted annotation, got {outcome:?}"),
        }
    }

    #[test]
    fn test_known_annotation() {
        let rect = ProjectedRect::new(208.0, 288.0, 432.0, 352.0);
        let annotation = accepted(encode(&rect, RES, 0, YOrigin::Top));

        assert_eq!(annotation.class_id, 0);
        assert_relative_eq!(annotation.x_center, 0.5);
        assert_relative_eq!(annotation.y_center, 0.5);
        assert_relative_eq!(annotation.width, 0.35);
        assert_relative_eq!(annotation.height, 0.1);
    }

    #[test]
    fn test_top_origin_flips_center_only() {
        let rect = ProjectedRect::new(100.0, 500.0, 200.0, 600.0);
        let top = accepted(encode(&rect, RES, 1, YOrigin::Top));
        let bottom = accepted(encode(&rect, RES, 1, YOrigin::Bottom));

        assert_relative_eq!(bottom.y_center, 550.0 / 640.0);
        assert_relative_eq!(top.y_center, 90.0 / 640.0);
        assert_relative_eq!(top.height, bottom.height);
        assert_relative_eq!(top.x_center, bottom.x_center);
    }

    #[test]
    fn test_inside_rect_stays_in_unit_range() {
        let rect = ProjectedRect::new(0.0, 0.0, 640.0, 640.0);
        let annotation = accepted(encode(&rect, RES, 2, YOrigin::Top));
        for value in [annotation.x_center, annotation.y_center, annotation.width, annotation.height] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_center_outside_frame_is_rejected() {
        let rect = ProjectedRect::new(700.0, 100.0, 800.0, 200.0);
        let outcome = encode(&rect, RES, 3, YOrigin::Top);
        assert!(outcome.is_rejected());
        assert!(matches!(outcome, EncodeOutcome::Rejected { class_id: 3, .. }));
    }

    #[test]
    fn test_center_on_edge_is_accepted() {
        // Partially clipped on the right; center exactly on the edge.
        let rect = ProjectedRect::new(600.0, 300.0, 680.0, 340.0);
        let annotation = accepted(encode(&rect, RES, 0, YOrigin::Bottom));
        assert_relative_eq!(annotation.x_center, 1.0);
        assert_relative_eq!(annotation.width, 0.125);
    }

    #[test]
    fn test_non_finite_center_is_rejected() {
        let rect = ProjectedRect::new(f64::NAN, 0.0, 10.0, 10.0);
        assert!(encode(&rect, RES, 0, YOrigin::Top).is_rejected());
    }

    #[test]
    fn test_denormalize_reproduces_rect() {
        let rect = ProjectedRect::new(13.25, 201.5, 377.0, 390.75);
        let resolution = Resolution::new(640, 480);
        for origin in [YOrigin::Top, YOrigin::Bottom] {
            let back = accepted(encode(&rect, resolution, 0, origin)).to_pixel_rect(resolution, origin);
            assert_relative_eq!(back.min_x, rect.min_x, max_relative = 1e-4);
            assert_relative_eq!(back.min_y, rect.min_y, max_relative = 1e-4);
            assert_relative_eq!(back.max_x, rect.max_x, max_relative = 1e-4);
            assert_relative_eq!(back.max_y, rect.max_y, max_relative = 1e-4);
        }
    }
}
