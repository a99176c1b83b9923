//! QProp configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnfisError, Result};

/// Adaptive-rate training configuration
///
/// Missing fields fall back to [`QPropConfig::default`] when decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QPropConfig {
    /// Stop once the mean batch error drops below this
    pub absolute_tolerance: f64,
    /// Stop once the error changes by less than this between steps
    pub relative_tolerance: f64,
    /// Rate growth factor on sign agreement
    pub eta_plus: f64,
    /// Rate shrink factor on sign flip
    pub eta_minus: f64,
    /// Upper bound for every learning rate
    pub delta_max: f64,
    /// Lower bound for every learning rate, and the reset value
    pub delta_min: f64,
    /// Rate every parameter starts with
    pub initial_learning_rate: f64,
    /// Largest premise partial tolerated before a warning is logged
    pub gradient_warn_threshold: f64,
}

impl Default for QPropConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-5,
            relative_tolerance: 1e-7,
            eta_plus: 1.2,
            eta_minus: 0.5,
            delta_max: 1.0,
            delta_min: 1e-8,
            initial_learning_rate: 1e-4,
            gradient_warn_threshold: 10.0,
        }
    }
}

impl QPropConfig {
    /// Larger starting rate, faster growth
    pub fn aggressive() -> Self {
        Self {
            eta_plus: 1.5,
            initial_learning_rate: 1e-2,
            ..Self::default()
        }
    }

    /// Slow growth, hard shrink, tight step ceiling
    pub fn conservative() -> Self {
        Self {
            eta_plus: 1.05,
            eta_minus: 0.3,
            delta_max: 0.1,
            initial_learning_rate: 1e-5,
            ..Self::default()
        }
    }

    /// Reject values that would break the rate bounds
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.absolute_tolerance,
            self.relative_tolerance,
            self.eta_plus,
            self.eta_minus,
            self.delta_max,
            self.delta_min,
            self.initial_learning_rate,
            self.gradient_warn_threshold,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(AnfisError::Config("all values must be finite".into()));
        }
        if self.absolute_tolerance < 0.0 || self.relative_tolerance < 0.0 {
            return Err(AnfisError::Config("tolerances must be non-negative".into()));
        }
        if self.eta_plus <= 1.0 {
            return Err(AnfisError::Config(format!(
                "eta_plus must exceed 1, got {}",
                self.eta_plus
            )));
        }
        if !(self.eta_minus > 0.0 && self.eta_minus < 1.0) {
            return Err(AnfisError::Config(format!(
                "eta_minus must lie in (0, 1), got {}",
                self.eta_minus
            )));
        }
        if !(self.delta_min > 0.0 && self.delta_min <= self.delta_max) {
            return Err(AnfisError::Config(format!(
                "need 0 < delta_min <= delta_max, got {} and {}",
                self.delta_min, self.delta_max
            )));
        }
        if self.initial_learning_rate < self.delta_min || self.initial_learning_rate > self.delta_max {
            return Err(AnfisError::Config(format!(
                "initial_learning_rate {} outside [{}, {}]",
                self.initial_learning_rate, self.delta_min, self.delta_max
            )));
        }
        Ok(())
    }

    /// Decode and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
