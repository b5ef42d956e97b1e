//! Dataset manifest and the files describing it

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetError;

/// Manifest filename written at the dataset root
pub const DATASET_YAML: &str = "dataset.yaml";

/// Image and label copied into the dataset, relative to its root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    /// e.g. `images/train/run_a_3.png`
    pub image: PathBuf,
    /// e.g. `labels/train/run_a_3.txt`
    pub label: PathBuf,
}

/// Everything the assembler produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetManifest {
    /// Absolute dataset root
    pub root: PathBuf,
    /// Training pairs
    pub train: Vec<DatasetEntry>,
    /// Held-out pairs
    pub test: Vec<DatasetEntry>,
    /// Class index to name
    pub names: BTreeMap<u32, String>,
    /// Source images without a label
    pub skipped: Vec<PathBuf>,
}

/// On-disk `dataset.yaml` layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetYaml {
    /// Absolute dataset root
    pub path: String,
    /// Training images directory, relative to `path`
    pub train: String,
    /// Validation images directory, relative to `path`
    pub val: String,
    /// Class index to name
    pub names: BTreeMap<u32, String>,
}

impl DatasetManifest {
    /// Total number of pairs
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    /// True when no pair was found
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `dataset.yaml` contents
    pub fn to_yaml(&self) -> DatasetYaml {
        DatasetYaml {
            path: self.root.to_string_lossy().into_owned(),
            train: "images/train".to_string(),
            val: "images/test".to_string(),
            names: self.names.clone(),
        }
    }

    /// Write `dataset.yaml`, `train.txt` and `test.txt` under the root
    pub fn write(&self) -> Result<(), DatasetError> {
        let yaml = serde_yaml::to_string(&self.to_yaml())?;
        write_file(&self.root.join(DATASET_YAML), &yaml)?;
        write_file(&self.root.join("train.txt"), &list(&self.train))?;
        write_file(&self.root.join("test.txt"), &list(&self.test))?;
        Ok(())
    }
}

fn list(entries: &[DatasetEntry]) -> String {
    entries.iter().fold(String::new(), |mut out, entry| {
        let _ = writeln!(out, "{}", entry.image.display());
        out
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), DatasetError> {
    std::fs::write(path, contents).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a `dataset.yaml` back
pub fn read_dataset_yaml(path: &Path) -> Result<DatasetYaml, DatasetError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip_through_disk() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let manifest = DatasetManifest {
            root: temp.path().to_path_buf(),
            train: vec![DatasetEntry {
                image: PathBuf::from("images/train/a_0.png"),
                label: PathBuf::from("labels/train/a_0.txt"),
            }],
            test: Vec::new(),
            names: BTreeMap::from([(0, "cable".to_string()), (1, "plug".to_string())]),
            skipped: Vec::new(),
        };
        manifest.write().expect("write manifest");

        let yaml = read_dataset_yaml(&temp.path().join(DATASET_YAML)).expect("read yaml");
        assert_eq!(yaml.train, "images/train");
        assert_eq!(yaml.val, "images/test");
        assert_eq!(yaml.names.get(&1).map(String::as_str), Some("plug"));
        assert_eq!(PathBuf::from(yaml.path), temp.path());

        let train = std::fs::read_to_string(temp.path().join("train.txt")).expect("train list");
        assert_eq!(train.trim(), "images/train/a_0.png");
        assert_eq!(std::fs::read_to_string(temp.path().join("test.txt")).expect("test list"), "");
    }
}
