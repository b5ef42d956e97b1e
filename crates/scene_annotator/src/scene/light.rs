//! Scene light and color temperature tones

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Nominal temperature reported for a light whose color was set directly
pub const NEUTRAL_KELVIN: u32 = 6500;

/// Kelvin to linear RGB lookup used for light color temperature sweeps
pub const COLOR_TEMPERATURE_TABLE: [(u32, [f32; 3]); 15] = [
    (3000, [1.0, 0.76, 0.64]),
    (3400, [1.0, 0.79, 0.66]),
    (3800, [1.0, 0.81, 0.68]),
    (4200, [1.0, 0.83, 0.69]),
    (4500, [1.0, 0.85, 0.70]),
    (4800, [1.0, 0.89, 0.74]),
    (5100, [1.0, 0.92, 0.78]),
    (5400, [1.0, 0.95, 0.84]),
    (5700, [1.0, 0.97, 0.90]),
    (6000, [1.0, 0.99, 0.96]),
    (6500, [1.0, 1.0, 1.0]),
    (6800, [0.94, 0.97, 1.0]),
    (7100, [0.91, 0.95, 1.0]),
    (7500, [0.88, 0.93, 1.0]),
    (8000, [0.85, 0.92, 1.0]),
];

/// A light color tagged with its color temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightTone {
    /// Color temperature in Kelvin
    pub kelvin: u32,
    /// Linear RGB color (0.0 to 1.0 range)
    pub color: Vec3,
}

impl LightTone {
    /// Tone for a color temperature, interpolated from [`COLOR_TEMPERATURE_TABLE`]
    ///
    /// Temperatures outside the table clamp to its first or last entry.
    pub fn from_kelvin(kelvin: u32) -> Self {
        let color = |entry: &[f32; 3]| Vec3::new(entry[0], entry[1], entry[2]);
        let (first_k, first_c) = &COLOR_TEMPERATURE_TABLE[0];
        let (last_k, last_c) = &COLOR_TEMPERATURE_TABLE[COLOR_TEMPERATURE_TABLE.len() - 1];

        let rgb = if kelvin <= *first_k {
            color(first_c)
        } else if kelvin >= *last_k {
            color(last_c)
        } else {
            COLOR_TEMPERATURE_TABLE
                .windows(2)
                .find(|pair| kelvin >= pair[0].0 && kelvin <= pair[1].0)
                .map_or_else(
                    || color(last_c),
                    |pair| {
                        let (k0, c0) = &pair[0];
                        let (k1, c1) = &pair[1];
                        let t = (kelvin - k0) as f32 / (k1 - k0) as f32;
                        color(c0).lerp(&color(c1), t)
                    },
                )
        };

        Self { kelvin, color: rgb }
    }

    /// Tone for a directly specified color, reported at the neutral temperature
    pub fn from_color(color: Vec3) -> Self {
        Self {
            kelvin: NEUTRAL_KELVIN,
            color,
        }
    }
}

impl Default for LightTone {
    fn default() -> Self {
        Self::from_kelvin(NEUTRAL_KELVIN)
    }
}

/// Point light state owned by the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    /// Position in world space
    pub position: Vec3,
    /// Current color tone
    pub tone: LightTone,
    /// Emitted power in watts
    pub energy: f32,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            tone: LightTone::default(),
            energy: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_table_entries_are_exact() {
        for (kelvin, rgb) in COLOR_TEMPERATURE_TABLE {
            let tone = LightTone::from_kelvin(kelvin);
            assert_eq!(tone.kelvin, kelvin);
            assert_relative_eq!(tone.color, Vec3::new(rgb[0], rgb[1], rgb[2]), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_interpolates_between_entries() {
        let tone = LightTone::from_kelvin(3200);
        assert_relative_eq!(tone.color, Vec3::new(1.0, 0.775, 0.65), epsilon = 1e-5);
    }

    #[test]
    fn test_clamps_outside_table() {
        assert_relative_eq!(LightTone::from_kelvin(1000).color, Vec3::new(1.0, 0.76, 0.64));
        assert_relative_eq!(LightTone::from_kelvin(20000).color, Vec3::new(0.85, 0.92, 1.0));
        assert_eq!(LightTone::from_kelvin(20000).kelvin, 20000);
    }

    #[test]
    fn test_table_is_sorted() {
        assert!(COLOR_TEMPERATURE_TABLE.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }
}
