//! # Annotation Pipeline
//!
//! Turns world-space bounding boxes into detection labels:
//!
//! ```text
//! world corners ──project──▶ ProjectedRect ──encode──▶ EncodeOutcome ──write_label──▶ .txt
//! ```
//!
//! Projection and encoding are pure functions over borrowed camera snapshots;
//! only the writer touches the filesystem.

mod encoder;
mod label;
mod projector;
mod writer;

pub use encoder::{encode, EncodeOutcome, NormalizedAnnotation, YOrigin};
pub use label::{parse_label, read_label, LabelError};
pub use projector::{project, project_points, ProjectedPoint, ProjectedRect, ProjectionError};
pub use writer::{format_line, label_path_for, write_label, LabelLayout, ObjectAnnotation, ANNOTATIONS_DIR};
