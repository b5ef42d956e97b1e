//! # Run Configuration
//!
//! File-backed configuration for the two long-running jobs: a capture sweep
//! and a dataset assembly. Both implement [`Config`], so they load from and
//! save to TOML or RON depending on the file extension.
//!
//! ## Capture sections
//!
//! - **output**: image directory, filename prefix, label layout and Y origin
//! - **scene**: camera, orbit rig, objects, light, jitter and which objects
//!   the sweep spins, jitters, re-materials or opens as a hinge
//! - **sweep**: axis values in a file-friendly form
//! - **renderer**: flat placeholder frames or an external program
//! - **targets**: class id to object names

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

use crate::capture::{AnnotationTarget, CaptureOptions, CommandRenderer, FlatRenderer, Renderer};
use crate::dataset::AssembleOptions;
use crate::foundation::math::{utils, Transform, Vec3};
use crate::scene::{
    Aabb, Camera, JitterSettings, LightState, LightTone, OrbitRig, Resolution, SceneBaseline, SceneError,
    SceneObject, SceneState, DEFAULT_SENSOR_WIDTH_MM,
};
use crate::sweep::{Axis, Sweep, SweepError, SweepPlan};

/// # Camera Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    /// Position in world space; ignored when an orbit rig places the camera
    pub position: Vec3,
    /// Look-at target; ignored when an orbit rig places the camera
    pub target: Vec3,
    /// Focal length in millimetres
    pub lens_mm: f32,
    /// Sensor width in millimetres
    pub sensor_width_mm: f32,
    /// Render resolution
    pub resolution: Resolution,
    /// Ring the camera is parented to
    pub orbit_rig: Option<OrbitRig>,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::zeros(),
            lens_mm: 35.0,
            sensor_width_mm: DEFAULT_SENSOR_WIDTH_MM,
            resolution: Resolution::default(),
            orbit_rig: Some(OrbitRig::default()),
        }
    }
}

impl CameraSection {
    fn build(&self) -> Camera {
        let mut camera = Camera::new(self.position, self.target, self.lens_mm, self.resolution);
        camera.sensor_width_mm = self.sensor_width_mm;
        camera
    }
}

/// An annotated object and its resting transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Unique name, referenced by targets and subject lists
    pub name: String,
    /// Local-space bounding box
    pub bounds: Aabb,
    /// World position
    #[serde(default = "zero_vec3")]
    pub position: Vec3,
    /// XYZ Euler rotation in degrees
    #[serde(default = "zero_vec3")]
    pub rotation_degrees: Vec3,
    /// Per-axis scale
    #[serde(default = "unit_vec3")]
    pub scale: Vec3,
    /// Initial material
    #[serde(default)]
    pub material: Option<String>,
}

fn zero_vec3() -> Vec3 {
    Vec3::zeros()
}

fn unit_vec3() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

impl ObjectSpec {
    /// Object lying on its side, spun about world Z by the rotation axis
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
            position: Vec3::zeros(),
            rotation_degrees: Vec3::new(0.0, 90.0, 0.0),
            scale: unit_vec3(),
            material: None,
        }
    }

    fn build(&self) -> SceneObject {
        let rotation = utils::euler_xyz_degrees(self.rotation_degrees);
        let base = Transform::from_position_rotation(self.position, rotation).with_scale(self.scale);
        let mut object = SceneObject::new(self.name.clone(), self.bounds, base);
        object.material.clone_from(&self.material);
        object
    }
}

/// # Scene Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSection {
    /// Camera and rig
    pub camera: CameraSection,
    /// Annotated objects
    pub objects: Vec<ObjectSpec>,
    /// Point light
    pub light: LightState,
    /// Jitter ranges and seed
    pub jitter: JitterSettings,
    /// Objects spun by the rotation axis
    pub rotation_subjects: Vec<String>,
    /// Objects offset when jitter is on
    pub jitter_subjects: Vec<String>,
    /// Objects whose material follows the material cycle
    pub material_subjects: Vec<String>,
    /// Two halves of a hinged object, or empty
    pub hinge_subjects: Vec<String>,
}

impl Default for SceneSection {
    fn default() -> Self {
        let subject = vec!["object".to_string()];
        Self {
            camera: CameraSection::default(),
            objects: vec![ObjectSpec::new(
                "object",
                Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.3, 0.05, 0.05)),
            )],
            light: LightState::default(),
            jitter: JitterSettings::default(),
            rotation_subjects: subject.clone(),
            jitter_subjects: subject.clone(),
            material_subjects: subject,
            hinge_subjects: Vec::new(),
        }
    }
}

impl SceneSection {
    /// Build the in-process scene
    pub fn build(&self) -> Result<SceneState, SceneError> {
        let mut scene = SceneState::new(self.camera.build())
            .with_jitter(self.jitter.clone())
            .with_light(self.light.clone());
        if let Some(rig) = &self.camera.orbit_rig {
            scene = scene.with_orbit_rig(rig.clone());
        }

        for spec in &self.objects {
            scene.add_object(spec.build())?;
        }
        scene.set_rotation_subjects(self.rotation_subjects.clone())?;
        scene.set_jitter_subjects(self.jitter_subjects.clone())?;
        scene.set_material_subjects(self.material_subjects.clone())?;
        scene.set_hinge_subjects(self.hinge_subjects.clone())?;
        Ok(scene)
    }

    fn baseline(&self) -> SceneBaseline {
        SceneBaseline {
            orbit_angle: 0.0,
            lens_mm: self.camera.lens_mm,
            rotation_degrees: 0.0,
            light_position: self.light.position,
            light_tone: self.light.tone,
            opening_degrees: 0.0,
        }
    }
}

/// Evenly spaced orbit frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitFrames {
    /// Number of frames
    pub frames: usize,
    /// Total angle covered, in degrees
    #[serde(default = "full_turn")]
    pub sweep_degrees: f32,
}

fn full_turn() -> f32 {
    360.0
}

/// Half-open stepped range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteppedRange {
    /// First value
    pub start: f32,
    /// Exclusive end
    pub stop: f32,
    /// Increment
    pub step: f32,
}

/// Evenly spaced values with both ends included
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRange {
    /// First value
    pub start: f32,
    /// Last value
    pub stop: f32,
    /// Number of values
    pub count: usize,
}

/// # Sweep Configuration
///
/// Explicit value lists win over the generated forms; everything left empty
/// collapses to the scene's current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSection {
    /// Explicit orbit angles in degrees
    pub orbit: Vec<f32>,
    /// Generated orbit angles, used when `orbit` is empty
    pub orbit_frames: Option<OrbitFrames>,
    /// Focal lengths in millimetres
    pub lens: Vec<f32>,
    /// Explicit object spins in degrees
    pub rotation: Vec<f32>,
    /// Generated spins, used when `rotation` is empty
    pub rotation_range: Option<SteppedRange>,
    /// Light positions
    pub light_positions: Vec<Vec3>,
    /// Light color temperatures in Kelvin
    pub light_kelvin: Vec<u32>,
    /// Light colors given directly, appended after the Kelvin tones
    pub light_colors: Vec<Vec3>,
    /// Explicit hinge opening angles in degrees
    pub opening: Vec<f32>,
    /// Generated opening angles, used when `opening` is empty
    pub opening_range: Option<LinearRange>,
    /// Jitter objects in every configuration
    pub jitter: bool,
    /// Mirror the hinge subjects on every other configuration
    pub alternate_mirror: bool,
    /// Material cycle
    pub materials: Vec<String>,
}

impl SweepSection {
    /// Expand into a sweep plan
    ///
    /// Fails when a generated axis would be too large to enumerate.
    pub fn to_plan(&self) -> Result<SweepPlan, SweepError> {
        let orbit = match (self.orbit.is_empty(), self.orbit_frames) {
            (true, Some(frames)) => Axis::orbit(frames.frames, frames.sweep_degrees)?,
            _ => Axis::new(self.orbit.clone()),
        };
        let rotation = match (self.rotation.is_empty(), self.rotation_range) {
            (true, Some(range)) => Axis::stepped(range.start, range.stop, range.step)?,
            _ => Axis::new(self.rotation.clone()),
        };
        let opening = match (self.opening.is_empty(), self.opening_range) {
            (true, Some(range)) => Axis::linear(range.start, range.stop, range.count)?,
            _ => Axis::new(self.opening.clone()),
        };
        let light_tone = self
            .light_kelvin
            .iter()
            .map(|&kelvin| LightTone::from_kelvin(kelvin))
            .chain(self.light_colors.iter().map(|&color| LightTone::from_color(color)))
            .collect();

        Ok(SweepPlan {
            orbit,
            lens: Axis::new(self.lens.clone()),
            rotation,
            light_position: Axis::new(self.light_positions.clone()),
            light_tone,
            opening,
            jitter: self.jitter,
            alternate_mirror: self.alternate_mirror,
            materials: self.materials.clone(),
        })
    }
}

/// Which renderer produces the images
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererConfig {
    /// Solid frames in the light color, for dry runs
    #[default]
    Flat,
    /// External program invoked per configuration
    Command(CommandRenderer),
}

impl RendererConfig {
    /// Instantiate the renderer
    pub fn build(&self, resolution: Resolution) -> Box<dyn Renderer> {
        match self {
            Self::Flat => Box::new(FlatRenderer::new(resolution)),
            Self::Command(command) => Box::new(command.clone()),
        }
    }
}

/// # Capture Configuration
///
/// Top-level configuration for a capture sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Output placement
    pub output: CaptureOptions,
    /// Scene description
    pub scene: SceneSection,
    /// Sweep axes
    pub sweep: SweepSection,
    /// Renderer selection
    pub renderer: RendererConfig,
    /// Annotation targets
    pub targets: Vec<AnnotationTarget>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output: CaptureOptions::default(),
            scene: SceneSection::default(),
            sweep: SweepSection {
                orbit_frames: Some(OrbitFrames {
                    frames: 8,
                    sweep_degrees: 360.0,
                }),
                lens: vec![35.0, 50.0],
                rotation_range: Some(SteppedRange {
                    start: 0.0,
                    stop: 180.0,
                    step: 45.0,
                }),
                light_kelvin: vec![4500, 6500],
                jitter: true,
                ..SweepSection::default()
            },
            renderer: RendererConfig::Flat,
            targets: vec![AnnotationTarget::single(0, "object")],
        }
    }
}

impl CaptureConfig {
    /// Build the scene described by the `scene` section
    pub fn build_scene(&self) -> Result<SceneState, SceneError> {
        self.scene.build()
    }

    /// Sweep plan from the `sweep` section
    pub fn sweep_plan(&self) -> Result<SweepPlan, SweepError> {
        self.sweep.to_plan()
    }

    /// Renderer from the `renderer` section
    pub fn build_renderer(&self) -> Box<dyn Renderer> {
        self.renderer.build(self.scene.camera.resolution)
    }

    /// Check everything that can be checked without touching the filesystem
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.scene.camera;
        if !camera.resolution.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "resolution {}x{} has a zero dimension",
                camera.resolution.width, camera.resolution.height
            )));
        }
        if !(camera.lens_mm > 0.0 && camera.sensor_width_mm > 0.0) {
            return Err(ConfigError::Invalid(
                "lens and sensor width must be positive".to_string(),
            ));
        }
        if self.output.prefix.is_empty() {
            return Err(ConfigError::Invalid("output prefix cannot be empty".to_string()));
        }
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("at least one annotation target is required".to_string()));
        }

        let names: BTreeSet<&str> = self.scene.objects.iter().map(|o| o.name.as_str()).collect();
        for target in &self.targets {
            if target.objects.is_empty() {
                return Err(ConfigError::Invalid(format!("target {} lists no objects", target.class_id)));
            }
            if let Some(unknown) = target.objects.iter().find(|name| !names.contains(name.as_str())) {
                return Err(ConfigError::Invalid(format!(
                    "target {} refers to unknown object '{}'",
                    target.class_id, unknown
                )));
            }
        }
        if let RendererConfig::Command(command) = &self.renderer {
            if command.program.trim().is_empty() {
                return Err(ConfigError::Invalid("renderer program cannot be empty".to_string()));
            }
        }

        self.scene.build().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let plan = self.sweep_plan().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Sweep::new(&plan, &self.scene.baseline()).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

impl Config for CaptureConfig {}

/// # Assembly Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleConfig {
    /// Directory tree of captures
    pub source: PathBuf,
    /// Dataset root to create
    pub dest: PathBuf,
    /// Split, seed and class names
    pub options: AssembleOptions,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("captures"),
            dest: PathBuf::from("dataset"),
            options: AssembleOptions::default(),
        }
    }
}

impl AssembleConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.options.split_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Invalid(format!("split ratio {ratio} is outside [0, 1]")));
        }
        if self.options.class_names.is_empty() {
            return Err(ConfigError::Invalid("at least one class name is required".to_string()));
        }
        if self.source == self.dest {
            return Err(ConfigError::Invalid("source and destination must differ".to_string()));
        }
        Ok(())
    }
}

impl Config for AssembleConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneProvider;

    #[test]
    fn test_default_capture_config_is_valid() {
        let config = CaptureConfig::default();
        config.validate().expect("default config validates");

        let scene = config.build_scene().expect("build scene");
        assert!(scene.has_object("object"));

        let plan = config.sweep_plan().expect("expand sweep");
        let sweep = Sweep::new(&plan, &scene.baseline()).expect("build sweep");
        // 8 orbit x 2 lens x 4 rotation x 1 position x 2 tones
        assert_eq!(sweep.len(), 128);
    }

    #[test]
    fn test_capture_config_round_trips_through_files() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut config = CaptureConfig::default();
        config.renderer = RendererConfig::Command(CommandRenderer::new(
            "blender",
            vec!["--render".to_string(), "{output}".to_string()],
        ));
        config.sweep.materials = vec!["matte".to_string(), "gloss".to_string()];

        for file in ["capture.toml", "capture.ron"] {
            let path = temp.path().join(file);
            config.save_to_file(&path).expect("save config");
            let loaded = CaptureConfig::load_from_file(&path).expect("load config");
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            [sweep]
            lens = [18.0, 50.0]

            [renderer.command]
            program = "render.sh"
            args = ["{output}", "{kelvin}"]
        "#;
        let config: CaptureConfig = toml::from_str(text).expect("parse");
        assert_eq!(config.sweep.lens, vec![18.0, 50.0]);
        assert!(config.sweep.orbit_frames.is_none());
        assert_eq!(config.output, CaptureOptions::default());
        assert_eq!(config.targets, vec![AnnotationTarget::single(0, "object")]);
        assert!(matches!(config.renderer, RendererConfig::Command(_)));
        config.validate().expect("partial config validates");
    }

    #[test]
    fn test_unknown_target_object_is_rejected() {
        let mut config = CaptureConfig::default();
        config.targets.push(AnnotationTarget::single(1, "socket"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("socket")));
    }

    #[test]
    fn test_invalid_sweep_value_is_rejected() {
        let mut config = CaptureConfig::default();
        config.sweep.lens = vec![35.0, -10.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("lens")));
    }

    #[test]
    fn test_sweep_section_expansion() {
        let section = SweepSection {
            orbit: vec![10.0],
            orbit_frames: Some(OrbitFrames {
                frames: 4,
                sweep_degrees: 360.0,
            }),
            rotation_range: Some(SteppedRange {
                start: 0.0,
                stop: 90.0,
                step: 30.0,
            }),
            light_kelvin: vec![3000],
            light_colors: vec![Vec3::new(1.0, 0.0, 0.0)],
            ..SweepSection::default()
        };
        let plan = section.to_plan().expect("expand sweep");
        assert_eq!(plan.orbit.values(), &[10.0]);
        assert_eq!(plan.rotation.values(), &[0.0, 30.0, 60.0]);
        assert_eq!(plan.light_tone.values().len(), 2);
        assert_eq!(plan.light_tone.values()[0].kelvin, 3000);
        assert_eq!(plan.light_tone.values()[1].color, Vec3::new(1.0, 0.0, 0.0));
        assert!(plan.lens.is_collapsed());
    }

    #[test]
    fn test_oversized_rotation_range_is_a_config_error() {
        let mut config = CaptureConfig::default();
        config.sweep.rotation_range = Some(SteppedRange {
            start: 0.0,
            stop: f32::MAX,
            step: 1e-30,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("too many")));
        assert_eq!(config.sweep_plan(), Err(SweepError::TooLarge));

        config.sweep.rotation_range = None;
        config.sweep.orbit_frames = Some(OrbitFrames {
            frames: usize::MAX,
            sweep_degrees: 360.0,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_hinge_section_from_toml() {
        let text = r#"
            [scene]
            hinge_subjects = ["jaw_a", "jaw_b"]
            rotation_subjects = []
            jitter_subjects = ["jaw_a", "jaw_b"]
            material_subjects = []

            [[scene.objects]]
            name = "jaw_a"
            bounds = { min = [0.0, -0.02, -0.01], max = [0.6, 0.02, 0.01] }

            [[scene.objects]]
            name = "jaw_b"
            bounds = { min = [0.0, -0.02, -0.01], max = [0.6, 0.02, 0.01] }

            [sweep]
            opening_range = { start = 30.0, stop = 120.0, count = 3 }
            alternate_mirror = true

            [[targets]]
            class_id = 0
            objects = ["jaw_a", "jaw_b"]
        "#;
        let config: CaptureConfig = toml::from_str(text).expect("parse");
        config.validate().expect("hinge config validates");

        let plan = config.sweep_plan().expect("expand sweep");
        assert_eq!(plan.opening.values(), &[30.0, 75.0, 120.0]);
        assert!(plan.alternate_mirror);

        let mut bad = config.clone();
        bad.scene.hinge_subjects.pop();
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("hinge")));
    }

    #[test]
    fn test_assemble_config_validation() {
        let mut config = AssembleConfig::default();
        config.validate().expect("default validates");

        config.options.split_ratio = 1.5;
        assert!(config.validate().is_err());

        config.options.split_ratio = 0.8;
        config.dest = config.source.clone();
        assert!(config.validate().is_err());
    }
}
