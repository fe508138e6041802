//! Effect parameters
//!
//! Per-invocation settings for the kaleidoscope, stored as JSON by the viewer
//! and patched by the remote-control feeds.

use crate::error::FilterError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_POWER: f32 = 2.0;
pub const DEFAULT_ANGLE: f32 = 0.0;

/// Round to nearest with halves going up: 2.5 -> 3, -0.5 -> 0, -2.5 -> -2
#[inline]
fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

/// Kaleidoscope settings. `power` and `angle` may be fractional; they are
/// rounded to the nearest integer when the filter runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParameters {
    /// Number of sector doublings (pattern repeats 2^power times)
    pub power: f32,
    /// Degrees; selects which wedge seeds the pattern
    pub angle: f32,
    /// Polar center; `None` is the image midpoint
    pub polar_center: Option<Point>,
    /// Degrees added when mapping back from polar space
    pub polar_rotation: f32,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            power: DEFAULT_POWER,
            angle: DEFAULT_ANGLE,
            polar_center: None,
            polar_rotation: 0.0,
        }
    }
}

impl EffectParameters {
    pub fn new(power: f32, angle: f32) -> Self {
        Self {
            power,
            angle,
            ..Self::default()
        }
    }

    /// Power rounded to the nearest integer, halves up. A negative result or
    /// non-finite power is rejected.
    pub fn rounded_power(&self) -> Result<u32, FilterError> {
        if !self.power.is_finite() {
            return Err(FilterError::invalid(format!(
                "power must be finite, got {}",
                self.power
            )));
        }
        let power = round_half_up(self.power);
        if power < 0.0 {
            return Err(FilterError::invalid(format!(
                "power must be >= 0, got {}",
                self.power
            )));
        }
        Ok(power.min(u32::MAX as f32) as u32)
    }

    /// Angle rounded to the nearest whole degree (halves up) and reduced into 0..360
    pub fn rounded_angle(&self) -> Result<i32, FilterError> {
        if !self.angle.is_finite() {
            return Err(FilterError::invalid(format!(
                "angle must be finite, got {}",
                self.angle
            )));
        }
        Ok(round_half_up(self.angle).rem_euclid(360.0) as i32)
    }

    /// Save parameters to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load parameters from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }
}

/// Partial update from a remote feed; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamUpdate {
    #[serde(default)]
    pub power: Option<f32>,
    #[serde(default)]
    pub angle: Option<f32>,
    #[serde(default)]
    pub polar_rotation: Option<f32>,
    #[serde(default)]
    pub polar_center: Option<Point>,
}

impl ParamUpdate {
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.angle.is_none()
            && self.polar_rotation.is_none()
            && self.polar_center.is_none()
    }

    /// Combine with a later update; fields set in `later` win
    pub fn merge(self, later: ParamUpdate) -> ParamUpdate {
        ParamUpdate {
            power: later.power.or(self.power),
            angle: later.angle.or(self.angle),
            polar_rotation: later.polar_rotation.or(self.polar_rotation),
            polar_center: later.polar_center.or(self.polar_center),
        }
    }

    /// Apply to `params`. Returns true if any value changed.
    pub fn apply_to(&self, params: &mut EffectParameters) -> bool {
        let before = *params;
        if let Some(power) = self.power {
            params.power = power;
        }
        if let Some(angle) = self.angle {
            params.angle = angle;
        }
        if let Some(rotation) = self.polar_rotation {
            params.polar_rotation = rotation;
        }
        if let Some(center) = self.polar_center {
            params.polar_center = Some(center);
        }
        *params != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = EffectParameters::default();
        assert_eq!(p.power, 2.0);
        assert_eq!(p.angle, 0.0);
        assert_eq!(p.polar_center, None);
        assert_eq!(p.polar_rotation, 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(EffectParameters::new(2.4, 0.0).rounded_power(), Ok(2));
        assert_eq!(EffectParameters::new(2.6, 0.0).rounded_power(), Ok(3));
        assert_eq!(EffectParameters::new(0.2, 0.0).rounded_power(), Ok(0));
        assert_eq!(EffectParameters::new(2.0, 44.6).rounded_angle(), Ok(45));
        assert_eq!(EffectParameters::new(2.0, -90.0).rounded_angle(), Ok(270));
        assert_eq!(EffectParameters::new(2.0, 725.0).rounded_angle(), Ok(5));
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(EffectParameters::new(2.5, 0.0).rounded_power(), Ok(3));
        assert_eq!(EffectParameters::new(-0.5, 0.0).rounded_power(), Ok(0));
        assert!(EffectParameters::new(-0.6, 0.0).rounded_power().is_err());
        assert_eq!(EffectParameters::new(2.0, 0.5).rounded_angle(), Ok(1));
        assert_eq!(EffectParameters::new(2.0, -2.5).rounded_angle(), Ok(358));
        assert_eq!(EffectParameters::new(2.0, -3.5).rounded_angle(), Ok(357));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            EffectParameters::new(-1.0, 0.0).rounded_power(),
            Err(FilterError::InvalidParameter(_))
        ));
        assert!(EffectParameters::new(f32::NAN, 0.0).rounded_power().is_err());
        assert!(EffectParameters::new(1.0, f32::INFINITY).rounded_angle().is_err());
    }

    #[test]
    fn test_json_missing_fields_use_defaults() {
        let p: EffectParameters = serde_json::from_str(r#"{"angle": 30}"#).unwrap();
        assert_eq!(p.power, 2.0);
        assert_eq!(p.angle, 30.0);

        let p: EffectParameters =
            serde_json::from_str(r#"{"polar_center": {"x": 4, "y": 5}}"#).unwrap();
        assert_eq!(p.polar_center, Some(Point::new(4.0, 5.0)));
    }

    #[test]
    fn test_save_load_file() {
        let path = std::env::temp_dir().join(format!(
            "kaleidoscope-params-{}.json",
            std::process::id()
        ));
        let params = EffectParameters {
            power: 3.0,
            angle: 120.0,
            polar_center: Some(Point::new(10.0, 12.5)),
            polar_rotation: 15.0,
        };
        params.save(&path).unwrap();
        let loaded = EffectParameters::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, params);
    }

    #[test]
    fn test_update_reports_changes() {
        let mut p = EffectParameters::default();
        let update = ParamUpdate {
            angle: Some(90.0),
            ..ParamUpdate::default()
        };
        assert!(update.apply_to(&mut p));
        assert_eq!(p.angle, 90.0);
        assert_eq!(p.power, 2.0);
        // Same value again is not a change
        assert!(!update.apply_to(&mut p));
        assert!(!ParamUpdate::default().apply_to(&mut p));
        assert!(ParamUpdate::default().is_empty());
    }

    #[test]
    fn test_merge_prefers_later_fields() {
        let first = ParamUpdate {
            power: Some(1.0),
            angle: Some(10.0),
            ..ParamUpdate::default()
        };
        let second = ParamUpdate {
            angle: Some(20.0),
            polar_rotation: Some(5.0),
            ..ParamUpdate::default()
        };
        let merged = first.merge(second);
        assert_eq!(merged.power, Some(1.0));
        assert_eq!(merged.angle, Some(20.0));
        assert_eq!(merged.polar_rotation, Some(5.0));
        assert_eq!(merged.polar_center, None);
    }
}
