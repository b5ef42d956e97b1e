//! A single swept parameter

use serde::{Deserialize, Serialize};

use crate::sweep::SweepError;

/// Most values a generated axis may hold
pub const MAX_AXIS_VALUES: usize = 1 << 20;

fn checked_count(count: f64) -> Result<usize, SweepError> {
    if count.is_finite() && count <= MAX_AXIS_VALUES as f64 {
        Ok(count.max(0.0) as usize)
    } else {
        Err(SweepError::TooLarge)
    }
}

/// Values one sweep parameter takes, in order
///
/// An empty axis is collapsed: it contributes exactly one value, the scene's
/// current one, resolved when the sweep is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Axis<T> {
    values: Vec<T>,
}

impl<T> Default for Axis<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> From<Vec<T>> for Axis<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<T> FromIterator<T> for Axis<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T: Clone> Axis<T> {
    /// Axis over explicit values
    pub fn new(values: impl Into<Vec<T>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Collapsed axis that keeps the scene's current value
    pub fn collapsed() -> Self {
        Self::default()
    }

    /// Axis with a single value
    pub fn fixed(value: T) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Configured values; empty when collapsed
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// True when the axis defers to the scene's current value
    pub fn is_collapsed(&self) -> bool {
        self.values.is_empty()
    }

    /// Concrete values, substituting `current` when collapsed
    pub fn resolve(&self, current: T) -> Vec<T> {
        if self.values.is_empty() {
            vec![current]
        } else {
            self.values.clone()
        }
    }
}

impl Axis<f32> {
    /// `frames` evenly spaced orbit angles: `sweep_degrees / frames * i`
    ///
    /// Zero frames gives a collapsed axis.
    pub fn orbit(frames: usize, sweep_degrees: f32) -> Result<Self, SweepError> {
        if frames > MAX_AXIS_VALUES {
            return Err(SweepError::TooLarge);
        }
        if frames == 0 {
            return Ok(Self::collapsed());
        }
        let step = sweep_degrees / frames as f32;
        Ok((0..frames).map(|i| step * i as f32).collect())
    }

    /// Half-open range `start, start + step, ...` stopping before `stop`
    ///
    /// A zero, negative or non-finite step gives a collapsed axis.
    pub fn stepped(start: f32, stop: f32, step: f32) -> Result<Self, SweepError> {
        if !(step.is_finite() && step > 0.0 && start.is_finite() && stop.is_finite()) {
            return Ok(Self::collapsed());
        }
        let count = checked_count(((f64::from(stop) - f64::from(start)) / f64::from(step)).ceil())?;
        Ok((0..count).map(|i| start + step * i as f32).collect())
    }

    /// `count` values from `start` to `stop`, both ends included
    ///
    /// Zero count gives a collapsed axis; a count of one gives `start`.
    pub fn linear(start: f32, stop: f32, count: usize) -> Result<Self, SweepError> {
        let count = checked_count(count as f64)?;
        match count {
            0 => Ok(Self::collapsed()),
            1 => Ok(Self::fixed(start)),
            _ => {
                let step = (stop - start) / (count - 1) as f32;
                Ok((0..count).map(|i| start + step * i as f32).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_collapsed_axis_resolves_to_current() {
        let axis: Axis<f32> = Axis::collapsed();
        assert!(axis.is_collapsed());
        assert_eq!(axis.resolve(35.0), vec![35.0]);

        let axis = Axis::new(vec![18.0, 50.0]);
        assert_eq!(axis.resolve(35.0), vec![18.0, 50.0]);
    }

    #[test]
    fn test_orbit_spacing() {
        let axis = Axis::orbit(4, -130.0).expect("orbit axis");
        let values = axis.values();
        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[0], 0.0);
        assert_relative_eq!(values[1], -32.5);
        assert_relative_eq!(values[3], -97.5);

        assert!(Axis::orbit(0, 90.0).expect("orbit axis").is_collapsed());
    }

    #[test]
    fn test_stepped_matches_half_open_range() {
        let axis = Axis::stepped(0.0, 360.0, 15.0).expect("stepped axis");
        assert_eq!(axis.values().len(), 24);
        assert_relative_eq!(axis.values()[23], 345.0);

        assert!(Axis::stepped(0.0, 360.0, 0.0).expect("stepped axis").is_collapsed());
        assert!(Axis::stepped(10.0, 0.0, 1.0).expect("stepped axis").is_collapsed());
    }

    #[test]
    fn test_oversized_generated_axes_are_too_large() {
        assert_eq!(Axis::stepped(0.0, f32::MAX, 1e-30), Err(SweepError::TooLarge));
        assert_eq!(Axis::stepped(0.0, 1e9, 1e-3), Err(SweepError::TooLarge));
        assert_eq!(Axis::orbit(usize::MAX, 360.0), Err(SweepError::TooLarge));
        assert_eq!(Axis::linear(0.0, 1.0, MAX_AXIS_VALUES + 1), Err(SweepError::TooLarge));

        let limit = Axis::stepped(0.0, MAX_AXIS_VALUES as f32, 1.0).expect("axis at the limit");
        assert_eq!(limit.values().len(), MAX_AXIS_VALUES);
    }

    #[test]
    fn test_linear_includes_both_ends() {
        let axis = Axis::linear(30.0, 120.0, 3).expect("linear axis");
        assert_eq!(axis.values(), &[30.0, 75.0, 120.0]);

        assert_eq!(Axis::linear(30.0, 120.0, 1).expect("linear axis").values(), &[30.0]);
        assert!(Axis::linear(30.0, 120.0, 0).expect("linear axis").is_collapsed());
    }
}
