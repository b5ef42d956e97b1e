//! Capture directories to a train/test dataset

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::annotation::ANNOTATIONS_DIR;
use crate::dataset::{DatasetEntry, DatasetError, DatasetManifest};

/// Image extensions picked up from capture directories
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Split, naming and class options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleOptions {
    /// Fraction of pairs going to the training split
    pub split_ratio: f64,
    /// Shuffle seed
    pub seed: u64,
    /// Class names, indexed by class id
    pub class_names: Vec<String>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            split_ratio: 0.8,
            seed: 42,
            class_names: vec!["object".to_string()],
        }
    }
}

/// A source image with its label and destination stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPair {
    /// Source image
    pub image: PathBuf,
    /// Source label
    pub label: PathBuf,
    /// Destination name without extension, `{subdir}_{counter}`
    pub stem: String,
}

impl DatasetPair {
    fn image_name(&self) -> String {
        match self.image.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}.{}", self.stem, ext.to_ascii_lowercase()),
            None => self.stem.clone(),
        }
    }
}

pub(crate) fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
}

/// Label for an image: a sibling `.txt`, else one under `annotations/`
pub(crate) fn find_label(image: &Path) -> Option<PathBuf> {
    let sibling = image.with_extension("txt");
    if sibling.is_file() {
        return Some(sibling);
    }
    let stem = image.file_stem()?.to_string_lossy();
    let nested = image.parent()?.join(ANNOTATIONS_DIR).join(format!("{stem}.txt"));
    nested.is_file().then_some(nested)
}

fn sorted_children(dir: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name().into_iter()
}

/// Builds a dataset from a directory of capture runs
#[derive(Debug, Clone, Default)]
pub struct DatasetAssembler {
    options: AssembleOptions,
}

impl DatasetAssembler {
    /// Assembler with `options`
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Pair images with labels across the immediate subdirectories of `source_root`
    ///
    /// Returns the pairs in sorted order and the images that had no label.
    pub fn collect_pairs(&self, source_root: &Path) -> Result<(Vec<DatasetPair>, Vec<PathBuf>), DatasetError> {
        if !source_root.is_dir() {
            return Err(DatasetError::MissingSource(source_root.to_path_buf()));
        }

        let mut pairs = Vec::new();
        let mut skipped = Vec::new();

        for run in sorted_children(source_root) {
            let run = run?;
            if !run.file_type().is_dir() {
                continue;
            }
            let run_name = run.file_name().to_string_lossy().into_owned();
            let mut counter = 0usize;

            for entry in sorted_children(run.path()) {
                let entry = entry?;
                if !entry.file_type().is_file() || !is_image(entry.path()) {
                    continue;
                }
                match find_label(entry.path()) {
                    Some(label) => {
                        pairs.push(DatasetPair {
                            image: entry.path().to_path_buf(),
                            label,
                            stem: format!("{run_name}_{counter}"),
                        });
                        counter += 1;
                    }
                    None => {
                        log::warn!("No label for {}; skipping", entry.path().display());
                        skipped.push(entry.path().to_path_buf());
                    }
                }
            }
            log::debug!("{}: {} pairs", run_name, counter);
        }
        Ok((pairs, skipped))
    }

    /// Shuffle, split and copy the pairs under `source_root` into `dest_root`
    ///
    /// Sources are copied, never moved. Writes `dataset.yaml`, `train.txt`
    /// and `test.txt` at the destination.
    pub fn assemble(&self, source_root: &Path, dest_root: &Path) -> Result<DatasetManifest, DatasetError> {
        let ratio = self.options.split_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(DatasetError::InvalidSplitRatio(ratio));
        }

        let (mut pairs, skipped) = self.collect_pairs(source_root)?;
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        pairs.shuffle(&mut rng);

        let train_len = (pairs.len() as f64 * ratio).floor() as usize;
        let (train, test) = pairs.split_at(train_len.min(pairs.len()));

        for dir in ["images/train", "images/test", "labels/train", "labels/test"] {
            let path = dest_root.join(dir);
            std::fs::create_dir_all(&path).map_err(|source| DatasetError::Io { path, source })?;
        }
        let root = std::fs::canonicalize(dest_root).map_err(|source| DatasetError::Io {
            path: dest_root.to_path_buf(),
            source,
        })?;

        let manifest = DatasetManifest {
            train: copy_split(train, &root, "train")?,
            test: copy_split(test, &root, "test")?,
            root,
            names: self
                .options
                .class_names
                .iter()
                .enumerate()
                .map(|(id, name)| (id as u32, name.clone()))
                .collect::<BTreeMap<_, _>>(),
            skipped,
        };
        manifest.write()?;

        log::info!(
            "Dataset at {}: {} train, {} test, {} skipped",
            manifest.root.display(),
            manifest.train.len(),
            manifest.test.len(),
            manifest.skipped.len()
        );
        Ok(manifest)
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<(), DatasetError> {
    std::fs::copy(from, to).map(|_| ()).map_err(|source| DatasetError::Io {
        path: from.to_path_buf(),
        source,
    })
}

fn copy_split(pairs: &[DatasetPair], root: &Path, split: &str) -> Result<Vec<DatasetEntry>, DatasetError> {
    pairs
        .iter()
        .map(|pair| {
            let entry = DatasetEntry {
                image: Path::new("images").join(split).join(pair.image_name()),
                label: Path::new("labels").join(split).join(format!("{}.txt", pair.stem)),
            };
            copy_file(&pair.image, &root.join(&entry.image))?;
            copy_file(&pair.label, &root.join(&entry.label))?;
            Ok(entry)
        })
        .collect()
}
