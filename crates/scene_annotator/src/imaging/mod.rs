//! Image utilities around captured datasets

mod overlay;
mod resize;

pub use overlay::{draw_annotations, overlay_file, overlay_tree, OverlaySummary, CLASS_PALETTE, LINE_THICKNESS};
pub use resize::{resize_and_crop, resize_tree, ResizeSummary, DEFAULT_TARGET_SIZE};

use std::path::PathBuf;

use crate::annotation::LabelError;

/// Image processing errors
#[derive(thiserror::Error, Debug)]
pub enum ImagingError {
    /// Decoding or encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Label file could not be read
    #[error(transparent)]
    Label(#[from] LabelError),

    /// Directory traversal failed
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// File operation failed
    #[error("IO error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Image or target size cannot be resized
    #[error("Cannot resize {width}x{height} image to {target}")]
    InvalidSize {
        /// Source width
        width: u32,
        /// Source height
        height: u32,
        /// Requested size
        target: u32,
    },
}
