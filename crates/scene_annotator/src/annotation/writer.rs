//! Label files and where they live

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotation::{EncodeOutcome, NormalizedAnnotation};

/// Default name of the label directory next to captured images
pub const ANNOTATIONS_DIR: &str = "annotations";

/// One object's encoding result for a label file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectAnnotation {
    /// Class index of the target
    pub class_id: u32,
    /// Encoder result
    pub outcome: EncodeOutcome,
}

/// Where label files are placed relative to their image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelLayout {
    /// `frame_0001.txt` next to `frame_0001.png`
    Sibling,
    /// `<dir>/frame_0001.txt` inside the image's directory
    Subdirectory(String),
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self::Subdirectory(ANNOTATIONS_DIR.to_string())
    }
}

impl LabelLayout {
    /// Directory labels go into for images stored in `image_dir`
    pub fn label_dir(&self, image_dir: &Path) -> PathBuf {
        match self {
            Self::Sibling => image_dir.to_path_buf(),
            Self::Subdirectory(dir) => image_dir.join(dir),
        }
    }
}

/// Label path for an image: same stem, `.txt` extension
pub fn label_path_for(image_path: &Path, layout: &LabelLayout) -> PathBuf {
    let parent = image_path.parent().unwrap_or_else(|| Path::new(""));
    let mut path = layout.label_dir(parent);
    path.push(image_path.file_name().unwrap_or_default());
    path.set_extension("txt");
    path
}

/// Format one label line
pub fn format_line(annotation: &NormalizedAnnotation) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}\n",
        annotation.class_id, annotation.x_center, annotation.y_center, annotation.width, annotation.height
    )
}

/// Write a label file, replacing any previous contents
///
/// Rejected objects are skipped, so a file with no lines is a valid label for
/// an image without visible objects. Returns the number of lines written.
pub fn write_label(path: &Path, records: &[ObjectAnnotation]) -> io::Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut lines = 0;
    for annotation in records.iter().filter_map(|record| record.outcome.accepted()) {
        writer.write_all(format_line(annotation).as_bytes())?;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}
