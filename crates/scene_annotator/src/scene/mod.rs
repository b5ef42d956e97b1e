//! Scene state and the provider interface the capture driver talks to
//!
//! ## Architecture
//!
//! ```text
//! Sweep configuration
//!      ↓
//! SceneProvider::apply_configuration (mutation)
//!      ↓
//! camera() / object_world_corners() (read-only snapshots)
//!      ↓
//! Projector
//! ```
//!
//! [`SceneState`] is the in-process provider: it owns the camera, the orbit
//! rig, the light and every annotated object. Anything that can answer the
//! same questions (an external scene server, a test stub) can implement
//! [`SceneProvider`] instead.

mod bounds;
mod camera;
mod light;
mod object;
mod state;

pub use bounds::Aabb;
pub use camera::{Camera, CameraModel, OrbitRig, Resolution, DEFAULT_SENSOR_WIDTH_MM};
pub use light::{LightState, LightTone, COLOR_TEMPERATURE_TABLE, NEUTRAL_KELVIN};
pub use object::SceneObject;
pub use state::{JitterSettings, SceneState};

use crate::foundation::math::{Point3, Vec3};
use crate::sweep::SweepConfiguration;

/// Current value of every sweep axis, read once before enumeration
///
/// Axes left empty in a sweep plan collapse to these values.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBaseline {
    /// Orbit ring angle in degrees
    pub orbit_angle: f32,
    /// Camera focal length in millimetres
    pub lens_mm: f32,
    /// Object spin in degrees
    pub rotation_degrees: f32,
    /// Light position in world space
    pub light_position: Vec3,
    /// Light color tone
    pub light_tone: LightTone,
    /// Opening angle between the hinge subjects in degrees
    pub opening_degrees: f32,
}

impl Default for SceneBaseline {
    fn default() -> Self {
        Self {
            orbit_angle: 0.0,
            lens_mm: 35.0,
            rotation_degrees: 0.0,
            light_position: LightState::default().position,
            light_tone: LightTone::default(),
            opening_degrees: 0.0,
        }
    }
}

/// Source of camera and object state for annotation
pub trait SceneProvider {
    /// Snapshot of the camera used for projection
    fn camera(&self) -> CameraModel;

    /// World-space bounding box corners of the named object, `None` if unknown
    fn object_world_corners(&self, name: &str) -> Option<Vec<Point3>>;

    /// Current value of every sweep axis
    fn baseline(&self) -> SceneBaseline;

    /// Mutate the scene to match `config`
    fn apply_configuration(&mut self, config: &SweepConfiguration);

    /// Restore the state the scene had before the first configuration
    fn reset(&mut self);

    /// True when `name` refers to an object the scene can project
    fn has_object(&self, name: &str) -> bool {
        self.object_world_corners(name).is_some()
    }
}

/// Scene construction errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Two objects share a name
    #[error("Duplicate scene object: {0}")]
    DuplicateObject(String),

    /// A name does not refer to any object
    #[error("Unknown scene object: {0}")]
    UnknownObject(String),

    /// A hinge is made of exactly two objects
    #[error("A hinge needs exactly two objects, got {0}")]
    InvalidHinge(usize),

    /// An object definition is unusable
    #[error("Invalid scene object '{name}': {reason}")]
    InvalidObject {
        /// Object name
        name: String,
        /// What is wrong with it
        reason: String,
    },
}
