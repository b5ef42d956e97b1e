//! # Scene Annotator
//!
//! Synthetic object-detection datasets from a 3D scene: sweep render
//! parameters deterministically, render every configuration and write a
//! bounding-box label for each image.
//!
//! ## Features
//!
//! - **Projection**: pinhole projection of world-space boxes to pixel rectangles
//! - **Labels**: normalized detection labels, one line per object
//! - **Sweeps**: orbit, lens, rotation, light and hinge axes enumerated in a fixed order
//! - **Capture**: apply, render, annotate and report for every configuration
//! - **Datasets**: seeded train/test splits with a `dataset.yaml` manifest
//! - **Imaging**: overlays for checking labels and square resize/crop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_annotator::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::load_from_file("capture.toml")?;
//!     let mut scene = config.build_scene()?;
//!     let sweep = Sweep::new(&config.sweep_plan()?, &scene.baseline())?;
//!     let mut renderer = config.build_renderer();
//!
//!     let mut driver = CaptureDriver::new(config.output.clone());
//!     let summary = driver.run(&sweep, &mut scene, renderer.as_mut(), &config.targets)?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod config;
pub mod scene;
pub mod annotation;
pub mod sweep;
pub mod capture;
pub mod dataset;
pub mod imaging;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        annotation::{encode, project, read_label, write_label, EncodeOutcome, NormalizedAnnotation, YOrigin},
        capture::{AnnotationTarget, CaptureDriver, CaptureOptions, CaptureSummary, Renderer},
        core::{AssembleConfig, CaptureConfig, Config},
        dataset::{AssembleOptions, DatasetAssembler},
        foundation::math::{Transform, Vec3},
        scene::{Aabb, Camera, SceneObject, SceneProvider, SceneState},
        sweep::{Axis, Sweep, SweepConfiguration, SweepPlan},
    };
}
