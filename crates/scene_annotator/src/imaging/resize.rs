//! Scale images to a target height and center-crop them square

use std::path::Path;

use image::imageops::{self, FilterType};
use image::DynamicImage;
use walkdir::WalkDir;

use crate::dataset::is_image;
use crate::imaging::ImagingError;

/// Default output edge length in pixels
pub const DEFAULT_TARGET_SIZE: u32 = 640;

/// Counts from a directory pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeSummary {
    /// Images rewritten
    pub processed: usize,
    /// Images that could not be read or written
    pub failed: usize,
}

/// Scale so the height equals `target`, then crop the width around the center
///
/// Images narrower than `target` after scaling keep their full width.
pub fn resize_and_crop(image: &DynamicImage, target: u32) -> Result<DynamicImage, ImagingError> {
    if target == 0 || image.height() == 0 {
        return Err(ImagingError::InvalidSize {
            width: image.width(),
            height: image.height(),
            target,
        });
    }

    let scale = f64::from(target) / f64::from(image.height());
    let scaled_width = ((f64::from(image.width()) * scale).round() as u32).max(1);
    let resized = image.resize_exact(scaled_width, target, FilterType::Triangle);

    let crop_width = scaled_width.min(target);
    let start_x = (scaled_width - crop_width) / 2;
    Ok(DynamicImage::ImageRgba8(
        imageops::crop_imm(&resized, start_x, 0, crop_width, target).to_image(),
    ))
}

fn resize_file(path: &Path, target: u32) -> Result<(), ImagingError> {
    let image = image::open(path)?;
    let cropped = resize_and_crop(&image, target)?;
    // Keep the source channel layout so JPEGs stay RGB.
    let cropped = match image {
        DynamicImage::ImageLuma8(_) => DynamicImage::ImageLuma8(cropped.to_luma8()),
        DynamicImage::ImageRgba8(_) => cropped,
        _ => DynamicImage::ImageRgb8(cropped.to_rgb8()),
    };
    cropped.save(path)?;
    Ok(())
}

/// Resize every image under `root` in place
///
/// Unreadable images are logged and counted, not fatal.
pub fn resize_tree(root: &Path, target: u32) -> Result<ResizeSummary, ImagingError> {
    let mut summary = ResizeSummary::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        match resize_file(entry.path(), target) {
            Ok(()) => {
                log::debug!("Resized {}", entry.path().display());
                summary.processed += 1;
            }
            Err(err) => {
                log::error!("Cannot resize {}: {}", entry.path().display(), err);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
