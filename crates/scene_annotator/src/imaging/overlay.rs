//! Draw label boxes over images for visual checks

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use walkdir::WalkDir;

use crate::annotation::{read_label, NormalizedAnnotation};
use crate::dataset::{find_label, is_image};
use crate::imaging::ImagingError;
use crate::scene::Resolution;

/// Box colors, picked by class id
pub const CLASS_PALETTE: [[u8; 3]; 6] = [
    [0, 255, 0],
    [255, 64, 64],
    [64, 128, 255],
    [255, 200, 0],
    [255, 0, 255],
    [0, 255, 255],
];

/// Outline thickness in pixels
pub const LINE_THICKNESS: u32 = 2;

fn class_color(class_id: u32) -> Rgb<u8> {
    Rgb(CLASS_PALETTE[class_id as usize % CLASS_PALETTE.len()])
}

/// Draw every annotation onto `image`
///
/// Boxes are clipped to the image; boxes entirely outside are skipped.
pub fn draw_annotations(image: &mut RgbImage, annotations: &[NormalizedAnnotation]) {
    let resolution = Resolution::new(image.width(), image.height());
    for annotation in annotations {
        let rect = annotation.to_image_rect(resolution);
        let x0 = rect.min_x.floor().max(0.0);
        let y0 = rect.min_y.floor().max(0.0);
        let x1 = rect.max_x.ceil().min(resolution.width_f64());
        let y1 = rect.max_y.ceil().min(resolution.height_f64());
        if x1 <= x0 || y1 <= y0 {
            log::debug!("Box for class {} lies outside the image", annotation.class_id);
            continue;
        }

        let color = class_color(annotation.class_id);
        for inset in 0..LINE_THICKNESS {
            let inset_f = f64::from(inset);
            let width = (x1 - x0 - 2.0 * inset_f) as u32;
            let height = (y1 - y0 - 2.0 * inset_f) as u32;
            if width == 0 || height == 0 {
                break;
            }
            let outline = Rect::at((x0 + inset_f) as i32, (y0 + inset_f) as i32).of_size(width, height);
            draw_hollow_rect_mut(image, outline, color);
        }
    }
}

/// Read an image and its label, draw the boxes and save to `output`
pub fn overlay_file(image_path: &Path, label_path: &Path, output: &Path) -> Result<usize, ImagingError> {
    let mut image = image::open(image_path)?.to_rgb8();
    let annotations = read_label(label_path)?;
    draw_annotations(&mut image, &annotations);
    image.save(output)?;
    Ok(annotations.len())
}

/// Results of a tree pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySummary {
    /// Overlays written, in walk order
    pub written: Vec<PathBuf>,
    /// Images or labels that could not be read, or overlays that could not be saved
    pub failed: usize,
}

fn overlay_entry(image: &Path, label: &Path, target: &Path) -> Result<usize, ImagingError> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ImagingError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    overlay_file(image, label, target)
}

/// Overlay every labelled image under `source`, mirroring the tree into `output`
///
/// Images without a label are skipped. Unreadable images or labels are
/// logged and counted, not fatal.
pub fn overlay_tree(source: &Path, output: &Path) -> Result<OverlaySummary, ImagingError> {
    let mut summary = OverlaySummary::default();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) || entry.path().starts_with(output) {
            continue;
        }
        let Some(label) = find_label(entry.path()) else {
            log::warn!("No label for {}", entry.path().display());
            continue;
        };

        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = output.join(relative);
        match overlay_entry(entry.path(), &label, &target) {
            Ok(boxes) => {
                log::debug!("{}: {} boxes", target.display(), boxes);
                summary.written.push(target);
            }
            Err(err) => {
                log::error!("Cannot overlay {}: {}", entry.path().display(), err);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(class_id: u32) -> NormalizedAnnotation {
        NormalizedAnnotation {
            class_id,
            x_center: 0.5,
            y_center: 0.5,
            width: 0.5,
            height: 0.25,
        }
    }

    #[test]
    fn test_outline_is_drawn_with_class_color() {
        let mut image = RgbImage::new(40, 40);
        draw_annotations(&mut image, &[annotation(1)]);

        // Box spans x 10..30, y 15..25 in image coordinates.
        assert_eq!(image.get_pixel(10, 15), &Rgb([255, 64, 64]));
        assert_eq!(image.get_pixel(11, 16), &Rgb([255, 64, 64]));
        assert_eq!(image.get_pixel(29, 24), &Rgb([255, 64, 64]));
        assert_eq!(image.get_pixel(20, 20), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_boxes_outside_the_image_are_skipped() {
        let mut image = RgbImage::new(10, 10);
        let outside = NormalizedAnnotation {
            x_center: 3.0,
            ..annotation(0)
        };
        draw_annotations(&mut image, &[outside]);
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_overlay_tree_mirrors_labelled_images() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("captures");
        let output = temp.path().join("overlay");
        std::fs::create_dir_all(source.join("annotations")).expect("create dirs");

        RgbImage::new(16, 16).save(source.join("frame_0000.png")).expect("save image");
        RgbImage::new(16, 16).save(source.join("frame_0001.png")).expect("save image");
        std::fs::write(source.join("annotations/frame_0000.txt"), "0 0.5 0.5 0.5 0.5\n").expect("label");

        let summary = overlay_tree(&source, &output).expect("overlay");
        assert_eq!(summary.written, vec![output.join("frame_0000.png")]);
        assert_eq!(summary.failed, 0);

        let drawn = image::open(&summary.written[0]).expect("open overlay").to_rgb8();
        assert_eq!(drawn.get_pixel(4, 4), &Rgb([0, 255, 0]));
    }

    #[test]
    fn test_overlay_tree_counts_unreadable_pairs_and_continues() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("captures");
        let output = temp.path().join("overlay");
        std::fs::create_dir_all(source.join("annotations")).expect("create dirs");

        std::fs::write(source.join("frame_0000.png"), b"not a png").expect("write broken image");
        std::fs::write(source.join("annotations/frame_0000.txt"), "0 0.5 0.5 0.5 0.5\n").expect("label");
        RgbImage::new(16, 16).save(source.join("frame_0001.png")).expect("save image");
        std::fs::write(source.join("annotations/frame_0001.txt"), "zero 0.5 0.5\n").expect("broken label");
        RgbImage::new(16, 16).save(source.join("frame_0002.png")).expect("save image");
        std::fs::write(source.join("annotations/frame_0002.txt"), "1 0.5 0.5 0.5 0.5\n").expect("label");

        let summary = overlay_tree(&source, &output).expect("overlay");
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.written, vec![output.join("frame_0002.png")]);
        assert!(output.join("frame_0002.png").exists());
    }
}
