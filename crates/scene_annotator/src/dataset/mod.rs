//! Dataset assembly
//!
//! A later filesystem pass over capture output: pairs every image with its
//! label, renames deterministically, shuffles with a seed and copies the pairs
//! into `images/{train,test}` and `labels/{train,test}` next to a
//! `dataset.yaml` manifest.

mod assembler;
mod manifest;

pub use assembler::{AssembleOptions, DatasetAssembler, DatasetPair, IMAGE_EXTENSIONS};
pub(crate) use assembler::{find_label, is_image};
pub use manifest::{read_dataset_yaml, DatasetEntry, DatasetManifest, DatasetYaml, DATASET_YAML};

use std::path::PathBuf;

/// Dataset assembly errors
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// Split ratio outside `[0, 1]`
    #[error("Split ratio {0} is outside [0, 1]")]
    InvalidSplitRatio(f64),

    /// Source root is not a directory
    #[error("Source directory {0} does not exist")]
    MissingSource(PathBuf),

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

    /// Manifest (de)serialization failed
    #[error("Manifest error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
