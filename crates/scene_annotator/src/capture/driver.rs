//! The capture loop

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::annotation::{
    encode, label_path_for, project, write_label, EncodeOutcome, LabelLayout, ObjectAnnotation, YOrigin,
};
use crate::capture::{LogProgress, ProgressObserver, ProgressReport, Renderer};
use crate::foundation::math::Point3;
use crate::foundation::time::{estimate_remaining, Stopwatch};
use crate::scene::SceneProvider;
use crate::sweep::{Sweep, SweepConfiguration};

/// Where and how captures are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Directory receiving images
    pub output_dir: PathBuf,
    /// Image filename prefix
    pub prefix: String,
    /// Label placement
    pub label_layout: LabelLayout,
    /// Y convention of written labels
    pub y_origin: YOrigin,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("captures"),
            prefix: "frame".to_string(),
            label_layout: LabelLayout::default(),
            y_origin: YOrigin::Top,
        }
    }
}

impl CaptureOptions {
    /// Image path for a subframe: `{output_dir}/{prefix}_{index:04}.png`
    pub fn image_path(&self, subframe_index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{:04}.png", self.prefix, subframe_index))
    }
}

/// Objects boxed together under one class
///
/// All listed objects are projected jointly into a single annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTarget {
    /// Class index written to labels
    pub class_id: u32,
    /// Scene object names
    pub objects: Vec<String>,
}

impl AnnotationTarget {
    /// Target made of a single object
    pub fn single(class_id: u32, object: impl Into<String>) -> Self {
        Self {
            class_id,
            objects: vec![object.into()],
        }
    }
}

/// Cooperative cancellation flag, checked between configurations
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// New, unset signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the sweep to stop after the current configuration
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`StopSignal::stop`] was called
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One configuration's outputs
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    /// Rendered image
    pub image_path: PathBuf,
    /// Label file
    pub label_path: PathBuf,
    /// Per-target encoding results
    pub objects: Vec<ObjectAnnotation>,
}

/// Counters for a finished or interrupted sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Configurations in the sweep
    pub total: usize,
    /// Configurations with both an image and a label
    pub completed: usize,
    /// Objects whose annotation was rejected
    pub rejected_annotations: usize,
    /// Labels that could not be written
    pub write_failures: usize,
    /// Configurations the renderer failed on
    pub render_failures: usize,
    /// Targets with nothing to project
    pub projection_errors: usize,
    /// True when a stop signal ended the sweep early
    pub interrupted: bool,
    /// Wall time of the sweep
    pub elapsed: Duration,
}

impl CaptureSummary {
    /// True when every configuration produced an image and a label
    pub fn is_clean(&self) -> bool {
        !self.interrupted && self.completed == self.total
    }
}

impl fmt::Display for CaptureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Captured {}/{} configurations in {:.1}s ({} rejected annotations, {} render failures, {} write failures, {} projection errors){}",
            self.completed,
            self.total,
            self.elapsed.as_secs_f64(),
            self.rejected_annotations,
            self.render_failures,
            self.write_failures,
            self.projection_errors,
            if self.interrupted { ", interrupted" } else { "" }
        )
    }
}

/// Errors that stop a sweep before it starts
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// Output or label directory could not be created
    #[error("Cannot create output directory {path}: {source}")]
    CreateOutputDir {
        /// Directory
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A target names an object the scene does not have
    #[error("Annotation target {class_id} refers to unknown object '{object}'")]
    UnknownObject {
        /// Target class
        class_id: u32,
        /// Missing object
        object: String,
    },

    /// A target lists no objects
    #[error("Annotation target {0} has no objects")]
    EmptyTarget(u32),
}

/// Runs sweeps: apply, render, annotate, write, report
pub struct CaptureDriver {
    options: CaptureOptions,
    stop: StopSignal,
    observer: Box<dyn ProgressObserver>,
}

impl fmt::Debug for CaptureDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureDriver")
            .field("options", &self.options)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

impl CaptureDriver {
    /// Driver reporting progress through the log
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            stop: StopSignal::new(),
            observer: Box::new(LogProgress),
        }
    }

    /// Replace the progress observer
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use an existing stop signal
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for stopping a running sweep
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Output options
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    fn prepare<S: SceneProvider + ?Sized>(&self, scene: &S, targets: &[AnnotationTarget]) -> Result<(), CaptureError> {
        for target in targets {
            if target.objects.is_empty() {
                return Err(CaptureError::EmptyTarget(target.class_id));
            }
            if let Some(object) = target.objects.iter().find(|name| !scene.has_object(name)) {
                return Err(CaptureError::UnknownObject {
                    class_id: target.class_id,
                    object: object.clone(),
                });
            }
        }

        let label_dir = self.options.label_layout.label_dir(&self.options.output_dir);
        for dir in [&self.options.output_dir, &label_dir] {
            std::fs::create_dir_all(dir).map_err(|source| CaptureError::CreateOutputDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn annotate<S: SceneProvider + ?Sized>(
        &self,
        scene: &S,
        targets: &[AnnotationTarget],
        summary: &mut CaptureSummary,
        config: &SweepConfiguration,
    ) -> Vec<ObjectAnnotation> {
        let camera = scene.camera();
        let mut records = Vec::with_capacity(targets.len());

        for target in targets {
            let corners: Vec<Point3> = target
                .objects
                .iter()
                .filter_map(|name| scene.object_world_corners(name))
                .flatten()
                .collect();

            let rect = match project(&camera, &corners) {
                Ok(rect) => rect,
                Err(err) => {
                    log::error!(
                        "Subframe {}: class {} ({}): {}",
                        config.subframe_index,
                        target.class_id,
                        target.objects.join(", "),
                        err
                    );
                    summary.projection_errors += 1;
                    continue;
                }
            };

            let outcome = encode(&rect, camera.resolution, target.class_id, self.options.y_origin);
            if let EncodeOutcome::Rejected { x_center, y_center, .. } = outcome {
                log::warn!(
                    "Subframe {}: class {} ({}) center ({:.4}, {:.4}) is outside the frame; not labelled",
                    config.subframe_index,
                    target.class_id,
                    target.objects.join(", "),
                    x_center,
                    y_center
                );
                summary.rejected_annotations += 1;
            }
            records.push(ObjectAnnotation {
                class_id: target.class_id,
                outcome,
            });
        }
        records
    }

    /// Run every configuration of `sweep`
    ///
    /// Per-configuration failures are logged and counted; only pre-flight
    /// problems are returned as errors, before the scene is touched. The scene
    /// is reset once after the loop, including when stopped early.
    pub fn run<S, R>(
        &mut self,
        sweep: &Sweep,
        scene: &mut S,
        renderer: &mut R,
        targets: &[AnnotationTarget],
    ) -> Result<CaptureSummary, CaptureError>
    where
        S: SceneProvider + ?Sized,
        R: Renderer + ?Sized,
    {
        self.prepare(scene, targets)?;

        let total = sweep.len();
        let mut summary = CaptureSummary {
            total,
            ..CaptureSummary::default()
        };
        log::info!(
            "Starting sweep of {} configurations into {}",
            total,
            self.options.output_dir.display()
        );

        let mut clock = Stopwatch::start_new();
        let mut processed = 0;

        for config in sweep.iter() {
            if self.stop.is_stopped() {
                log::warn!("Sweep stopped after {processed} of {total} configurations");
                summary.interrupted = true;
                break;
            }

            scene.apply_configuration(&config);
            let image_path = self.options.image_path(config.subframe_index);

            match renderer.render(&config, &image_path) {
                Ok(()) => {
                    let record = CaptureRecord {
                        label_path: label_path_for(&image_path, &self.options.label_layout),
                        objects: self.annotate(scene, targets, &mut summary, &config),
                        image_path: image_path.clone(),
                    };
                    self.write_record(&record, &mut summary);
                }
                Err(err) => {
                    log::error!("Render failed for {}: {}", image_path.display(), err);
                    summary.render_failures += 1;
                }
            }

            processed += 1;
            let step = clock.lap();
            let report = ProgressReport {
                index: config.subframe_index,
                completed: processed,
                total,
                elapsed: clock.elapsed(),
                step,
                eta: estimate_remaining(step, total - processed),
                image_path,
            };
            self.observer.on_progress(&report);
        }

        scene.reset();
        summary.elapsed = clock.elapsed();
        self.observer.on_finish(&summary);
        Ok(summary)
    }

    fn write_record(&self, record: &CaptureRecord, summary: &mut CaptureSummary) {
        match write_label(&record.label_path, &record.objects) {
            Ok(lines) => {
                log::debug!("Wrote {} ({} objects)", record.label_path.display(), lines);
                summary.completed += 1;
            }
            Err(err) => {
                log::error!("Cannot write label {}: {}", record.label_path.display(), err);
                summary.write_failures += 1;
            }
        }
    }
}
