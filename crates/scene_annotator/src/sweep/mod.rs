//! Deterministic render-parameter sweeps
//!
//! A [`SweepPlan`] names the values of each axis; [`Sweep::new`] resolves the
//! collapsed axes against a [`SceneBaseline`], validates every value and fixes
//! the total count. Iteration is the Cartesian product in this nesting order,
//! outermost first:
//!
//! 1. orbit angle (the frame)
//! 2. lens focal length
//! 3. object rotation
//! 4. light position
//! 5. light tone
//! 6. hinge opening angle
//!
//! Each configuration's `subframe_index` is its position in that order and is
//! the only input to output filenames.

mod axis;

pub use axis::{Axis, MAX_AXIS_VALUES};

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};
use crate::scene::{LightTone, SceneBaseline};

/// Axis values plus the per-configuration toggles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepPlan {
    /// Orbit ring angles in degrees
    pub orbit: Axis<f32>,
    /// Focal lengths in millimetres
    pub lens: Axis<f32>,
    /// Object spin in degrees
    pub rotation: Axis<f32>,
    /// Light positions in world space
    pub light_position: Axis<Vec3>,
    /// Light tones
    pub light_tone: Axis<LightTone>,
    /// Opening angle between the two hinge subjects, in degrees
    pub opening: Axis<f32>,
    /// Randomly offset jitter subjects in every configuration
    pub jitter: bool,
    /// Mirror the hinge subjects on even subframes
    pub alternate_mirror: bool,
    /// Materials assigned in turn by subframe index
    pub materials: Vec<String>,
}

/// One fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfiguration {
    /// Zero-based position in the sweep
    pub subframe_index: usize,
    /// Index on the orbit axis
    pub frame_index: usize,
    /// Orbit ring angle in degrees
    pub orbit_angle: f32,
    /// Focal length in millimetres
    pub lens_mm: f32,
    /// Object spin in degrees
    pub rotation_degrees: f32,
    /// Light position in world space
    pub light_position: Vec3,
    /// Light tone
    pub light_tone: LightTone,
    /// Opening angle between the hinge subjects in degrees
    pub opening_degrees: f32,
    /// Whether positional jitter applies
    pub jitter: bool,
    /// Whether the hinge subjects are mirrored along their local Z
    pub mirrored: bool,
    /// Material for material subjects
    pub material: Option<String>,
}

/// Sweep construction errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    /// Axis lengths multiply past `usize::MAX`, or a generated axis
    /// exceeds [`MAX_AXIS_VALUES`]
    #[error("Sweep has too many configurations to enumerate")]
    TooLarge,

    /// A value cannot be applied to a scene
    #[error("Invalid {axis} value at index {index}: {reason}")]
    InvalidValue {
        /// Axis name
        axis: &'static str,
        /// Index within the axis
        index: usize,
        /// What is wrong with it
        reason: String,
    },
}

fn check_all<T>(
    axis: &'static str,
    values: &[T],
    check: impl Fn(&T) -> Option<String>,
) -> Result<(), SweepError> {
    for (index, value) in values.iter().enumerate() {
        if let Some(reason) = check(value) {
            return Err(SweepError::InvalidValue { axis, index, reason });
        }
    }
    Ok(())
}

fn finite_angle(value: &f32) -> Option<String> {
    (!value.is_finite()).then(|| format!("{value} is not finite"))
}

/// A validated, restartable sweep
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    orbit: Vec<f32>,
    lens: Vec<f32>,
    rotation: Vec<f32>,
    light_position: Vec<Vec3>,
    light_tone: Vec<LightTone>,
    opening: Vec<f32>,
    jitter: bool,
    alternate_mirror: bool,
    materials: Vec<String>,
    len: usize,
}

impl Sweep {
    /// Resolve `plan` against the scene's current values and validate it
    pub fn new(plan: &SweepPlan, baseline: &SceneBaseline) -> Result<Self, SweepError> {
        let orbit = plan.orbit.resolve(baseline.orbit_angle);
        let lens = plan.lens.resolve(baseline.lens_mm);
        let rotation = plan.rotation.resolve(baseline.rotation_degrees);
        let light_position = plan.light_position.resolve(baseline.light_position);
        let light_tone = plan.light_tone.resolve(baseline.light_tone);
        let opening = plan.opening.resolve(baseline.opening_degrees);

        check_all("orbit", &orbit, finite_angle)?;
        check_all("lens", &lens, |value| {
            (!(value.is_finite() && *value > 0.0))
                .then(|| format!("{value} is not a positive focal length"))
        })?;
        check_all("rotation", &rotation, finite_angle)?;
        check_all("light_position", &light_position, |value| {
            (!utils::is_finite_vec3(value)).then(|| format!("{value:?} is not finite"))
        })?;
        check_all("light_tone", &light_tone, |tone| {
            (!utils::is_finite_vec3(&tone.color)).then(|| format!("color {:?} is not finite", tone.color))
        })?;
        check_all("opening", &opening, finite_angle)?;

        let len = [
            orbit.len(),
            lens.len(),
            rotation.len(),
            light_position.len(),
            light_tone.len(),
            opening.len(),
        ]
        .into_iter()
        .try_fold(1usize, usize::checked_mul)
        .ok_or(SweepError::TooLarge)?;

        log::debug!(
            "Sweep resolved: {} orbit x {} lens x {} rotation x {} light position x {} tone x {} opening = {}",
            orbit.len(),
            lens.len(),
            rotation.len(),
            light_position.len(),
            light_tone.len(),
            opening.len(),
            len
        );

        Ok(Self {
            orbit,
            lens,
            rotation,
            light_position,
            light_tone,
            opening,
            jitter: plan.jitter,
            alternate_mirror: plan.alternate_mirror,
            materials: plan.materials.clone(),
            len,
        })
    }

    /// Total number of configurations
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there is nothing to run
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of orbit frames
    pub fn frame_count(&self) -> usize {
        self.orbit.len()
    }

    /// The configuration at `subframe_index`, decoded directly
    pub fn configuration(&self, subframe_index: usize) -> Option<SweepConfiguration> {
        if subframe_index >= self.len {
            return None;
        }

        // Innermost axis varies fastest.
        let mut rest = subframe_index;
        let mut digit = |len: usize| {
            let value = rest % len;
            rest /= len;
            value
        };
        let opening = digit(self.opening.len());
        let tone = digit(self.light_tone.len());
        let position = digit(self.light_position.len());
        let rotation = digit(self.rotation.len());
        let lens = digit(self.lens.len());
        let frame = digit(self.orbit.len());

        let material = (!self.materials.is_empty())
            .then(|| self.materials[subframe_index % self.materials.len()].clone());

        Some(SweepConfiguration {
            subframe_index,
            frame_index: frame,
            orbit_angle: self.orbit[frame],
            lens_mm: self.lens[lens],
            rotation_degrees: self.rotation[rotation],
            light_position: self.light_position[position],
            light_tone: self.light_tone[tone],
            opening_degrees: self.opening[opening],
            jitter: self.jitter,
            mirrored: self.alternate_mirror && subframe_index % 2 == 0,
            material,
        })
    }

    /// Iterate every configuration from the start
    pub fn iter(&self) -> SweepIter<'_> {
        SweepIter {
            sweep: self,
            next: 0,
            end: self.len,
        }
    }
}

impl<'a> IntoIterator for &'a Sweep {
    type Item = SweepConfiguration;
    type IntoIter = SweepIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`Sweep`]
#[derive(Debug, Clone)]
pub struct SweepIter<'a> {
    sweep: &'a Sweep,
    next: usize,
    end: usize,
}

impl Iterator for SweepIter<'_> {
    type Item = SweepConfiguration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let config = self.sweep.configuration(self.next);
        self.next += 1;
        config
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n).min(self.end);
        self.next()
    }
}

impl DoubleEndedIterator for SweepIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        self.sweep.configuration(self.end)
    }
}

impl ExactSizeIterator for SweepIter<'_> {}

impl FusedIterator for SweepIter<'_> {}
