//! In-process scene owner

use std::collections::BTreeMap;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Point3, Vec3};
use crate::scene::{
    Camera, CameraModel, LightState, OrbitRig, SceneBaseline, SceneError, SceneObject,
    SceneProvider,
};
use crate::sweep::SweepConfiguration;

/// Positional jitter ranges
///
/// Wide-angle lenses see more of the table, so objects get a narrower range
/// to keep them in frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterSettings {
    /// RNG seed, reapplied on every reset
    pub seed: u64,
    /// Half-range in world units below the lens threshold
    pub narrow_range: f32,
    /// Half-range in world units at or above the lens threshold
    pub wide_range: f32,
    /// Focal length separating the two ranges, in millimetres
    pub wide_lens_threshold_mm: f32,
}

impl Default for JitterSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            narrow_range: 0.1,
            wide_range: 0.3,
            wide_lens_threshold_mm: 35.0,
        }
    }
}

impl JitterSettings {
    /// Half-range to use for a given focal length
    pub fn range_for(&self, lens_mm: f32) -> f32 {
        if lens_mm < self.wide_lens_threshold_mm {
            self.narrow_range.abs()
        } else {
            self.wide_range.abs()
        }
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    camera: Camera,
    orbit_angle: f32,
    objects: BTreeMap<String, SceneObject>,
    light: LightState,
}

/// Single owner of all mutable scene state
///
/// The first applied configuration snapshots the scene; [`SceneProvider::reset`]
/// restores that snapshot and reseeds the jitter RNG.
#[derive(Debug, Clone)]
pub struct SceneState {
    camera: Camera,
    rig: Option<OrbitRig>,
    orbit_angle: f32,
    objects: BTreeMap<String, SceneObject>,
    rotation_subjects: Vec<String>,
    jitter_subjects: Vec<String>,
    material_subjects: Vec<String>,
    hinge_subjects: Vec<String>,
    light: LightState,
    jitter: JitterSettings,
    rng: StdRng,
    initial: Option<Snapshot>,
}

impl SceneState {
    /// Create a scene with a camera and no objects
    pub fn new(camera: Camera) -> Self {
        let jitter = JitterSettings::default();
        Self {
            camera,
            rig: None,
            orbit_angle: 0.0,
            objects: BTreeMap::new(),
            rotation_subjects: Vec::new(),
            jitter_subjects: Vec::new(),
            material_subjects: Vec::new(),
            hinge_subjects: Vec::new(),
            light: LightState::default(),
            rng: StdRng::seed_from_u64(jitter.seed),
            jitter,
            initial: None,
        }
    }

    /// Parent the camera to an orbit rig, placing it at angle zero
    #[must_use]
    pub fn with_orbit_rig(mut self, rig: OrbitRig) -> Self {
        rig.place(&mut self.camera, 0.0);
        self.rig = Some(rig);
        self.orbit_angle = 0.0;
        self
    }

    /// Replace the jitter settings and reseed
    #[must_use]
    pub fn with_jitter(mut self, jitter: JitterSettings) -> Self {
        self.rng = StdRng::seed_from_u64(jitter.seed);
        self.jitter = jitter;
        self
    }

    /// Replace the light
    #[must_use]
    pub fn with_light(mut self, light: LightState) -> Self {
        self.light = light;
        self
    }

    /// Add an object; names must be unique
    pub fn add_object(&mut self, object: SceneObject) -> Result<(), SceneError> {
        if !object.bounds.is_valid() {
            return Err(SceneError::InvalidObject {
                name: object.name,
                reason: "bounds min exceeds max".to_string(),
            });
        }
        if self.objects.contains_key(&object.name) {
            return Err(SceneError::DuplicateObject(object.name));
        }
        log::debug!("Added scene object '{}'", object.name);
        self.objects.insert(object.name.clone(), object);
        Ok(())
    }

    fn check_known(&self, names: &[String]) -> Result<(), SceneError> {
        match names.iter().find(|name| !self.objects.contains_key(*name)) {
            Some(unknown) => Err(SceneError::UnknownObject(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Objects spun by the rotation axis
    pub fn set_rotation_subjects(&mut self, names: Vec<String>) -> Result<(), SceneError> {
        self.check_known(&names)?;
        self.rotation_subjects = names;
        Ok(())
    }

    /// Objects moved when jitter is enabled
    pub fn set_jitter_subjects(&mut self, names: Vec<String>) -> Result<(), SceneError> {
        self.check_known(&names)?;
        self.jitter_subjects = names;
        Ok(())
    }

    /// Objects whose material follows the sweep's material cycle
    pub fn set_material_subjects(&mut self, names: Vec<String>) -> Result<(), SceneError> {
        self.check_known(&names)?;
        self.material_subjects = names;
        Ok(())
    }

    /// The two halves of a hinged object, opened symmetrically
    ///
    /// The first turns by minus half the opening angle, the second by plus
    /// half. An empty list disables the hinge.
    pub fn set_hinge_subjects(&mut self, names: Vec<String>) -> Result<(), SceneError> {
        if !(names.is_empty() || names.len() == 2) {
            return Err(SceneError::InvalidHinge(names.len()));
        }
        self.check_known(&names)?;
        self.hinge_subjects = names;
        Ok(())
    }

    /// Look up an object
    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    /// Object names in sorted order
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// The scene camera
    pub fn camera_state(&self) -> &Camera {
        &self.camera
    }

    /// The scene light
    pub fn light(&self) -> &LightState {
        &self.light
    }

    /// Current orbit ring angle in degrees
    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    fn set_orbit_angle(&mut self, angle_degrees: f32) {
        if let Some(rig) = &self.rig {
            rig.place(&mut self.camera, angle_degrees);
            self.orbit_angle = angle_degrees;
        } else if angle_degrees.abs() > f32::EPSILON {
            log::warn!("Orbit angle {angle_degrees} requested but the camera has no orbit rig");
        }
    }

    fn apply_jitter(&mut self, enabled: bool, lens_mm: f32) {
        let range = self.jitter.range_for(lens_mm);
        for name in &self.jitter_subjects {
            let Some(object) = self.objects.get_mut(name) else {
                continue;
            };
            object.jitter_offset = if enabled {
                Vec3::new(
                    self.rng.gen_range(-range..=range),
                    self.rng.gen_range(-range..=range),
                    0.0,
                )
            } else {
                Vec3::zeros()
            };
            log::trace!("Jitter offset for '{}': {:?}", name, object.jitter_offset);
        }
    }

    fn apply_hinge(&mut self, opening_degrees: f32, mirrored: bool) {
        let [closing, opening] = self.hinge_subjects.as_slice() else {
            return;
        };
        let half = opening_degrees / 2.0;
        for (name, angle) in [(closing, -half), (opening, half)] {
            if let Some(object) = self.objects.get_mut(name) {
                object.hinge_degrees = angle;
                object.mirrored = mirrored;
            }
        }
    }

    fn opening_degrees(&self) -> f32 {
        match self.hinge_subjects.as_slice() {
            [closing, opening] => match (self.objects.get(closing), self.objects.get(opening)) {
                (Some(closing), Some(opening)) => opening.hinge_degrees - closing.hinge_degrees,
                _ => 0.0,
            },
            _ => 0.0,
        }
    }
}

impl SceneProvider for SceneState {
    fn camera(&self) -> CameraModel {
        self.camera.model()
    }

    fn object_world_corners(&self, name: &str) -> Option<Vec<Point3>> {
        self.objects.get(name).map(|object| object.world_corners().to_vec())
    }

    fn baseline(&self) -> SceneBaseline {
        let rotation_degrees = self
            .rotation_subjects
            .first()
            .and_then(|name| self.objects.get(name))
            .map_or(0.0, |object| object.spin_degrees);

        SceneBaseline {
            orbit_angle: self.orbit_angle,
            lens_mm: self.camera.lens_mm,
            rotation_degrees,
            light_position: self.light.position,
            light_tone: self.light.tone,
            opening_degrees: self.opening_degrees(),
        }
    }

    fn apply_configuration(&mut self, config: &SweepConfiguration) {
        if self.initial.is_none() {
            self.initial = Some(Snapshot {
                camera: self.camera.clone(),
                orbit_angle: self.orbit_angle,
                objects: self.objects.clone(),
                light: self.light.clone(),
            });
        }

        self.set_orbit_angle(config.orbit_angle);
        self.camera.set_lens(config.lens_mm);

        for name in &self.rotation_subjects {
            if let Some(object) = self.objects.get_mut(name) {
                object.spin_degrees = config.rotation_degrees;
            }
        }

        if utils::is_finite_vec3(&config.light_position) {
            self.light.position = config.light_position;
        }
        self.light.tone = config.light_tone;

        self.apply_jitter(config.jitter, config.lens_mm);
        self.apply_hinge(config.opening_degrees, config.mirrored);

        if let Some(material) = &config.material {
            for name in &self.material_subjects {
                if let Some(object) = self.objects.get_mut(name) {
                    object.material = Some(material.clone());
                }
            }
        }
    }

    fn reset(&mut self) {
        if let Some(snapshot) = self.initial.take() {
            self.camera = snapshot.camera;
            self.orbit_angle = snapshot.orbit_angle;
            self.objects = snapshot.objects;
            self.light = snapshot.light;
            log::debug!("Scene restored to its pre-sweep state");
        }
        self.rng = StdRng::seed_from_u64(self.jitter.seed);
    }
}
