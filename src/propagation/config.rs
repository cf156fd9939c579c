//! Propagation settings.

use serde::{Deserialize, Serialize};

use crate::math::units::{M, MM, UM};

/// Tolerances and buffer sizes of the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Tolerance added to mask bounds when classifying intersections.
    pub mask_tolerance: f64,
    /// Distance below which a candidate counts as reached.
    pub on_surface_tolerance: f64,
    /// Most negative path a candidate may have before it is dropped as
    /// overstepped.
    pub overstep_tolerance: f64,
    /// Initial capacity of the candidate buffer.
    pub candidate_capacity: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mask_tolerance: 1.0 * UM,
            on_surface_tolerance: 1.0 * UM,
            overstep_tolerance: -100.0 * UM,
            candidate_capacity: 32,
        }
    }
}

/// Step size limits of the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteppingConfig {
    pub max_step_size: f64,
    pub min_step_size: f64,
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            max_step_size: 1.0 * M,
            min_step_size: 1e-4 * MM,
        }
    }
}

/// Complete propagation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    pub navigation: NavigationConfig,
    pub stepping: SteppingConfig,
    /// Steps after which a propagation is aborted.
    pub max_steps: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            navigation: NavigationConfig::default(),
            stepping: SteppingConfig::default(),
            max_steps: 10_000,
        }
    }
}

impl PropagationConfig {
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_max_step_size(mut self, size: f64) -> Self {
        self.stepping.max_step_size = size;
        self
    }

    #[must_use]
    pub fn with_mask_tolerance(mut self, tolerance: f64) -> Self {
        self.navigation.mask_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_on_surface_tolerance(mut self, tolerance: f64) -> Self {
        self.navigation.on_surface_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "max_steps": 50, "navigation": { "mask_tolerance": 0.01 } }"#;
        let config: PropagationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.navigation.mask_tolerance, 0.01);
        assert_eq!(config.navigation.overstep_tolerance, -100.0 * UM);
        assert_eq!(config.stepping, SteppingConfig::default());
    }

    #[test]
    fn json_roundtrip() {
        let config = PropagationConfig::default().with_max_steps(7).with_max_step_size(5.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: PropagationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
