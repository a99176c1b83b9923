//! Epoch loop over a [`Training`] scheme

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rule::Rule;

use super::Training;

/// Epoch loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Upper bound on training steps
    pub max_epochs: usize,
    /// Log an info line every this many epochs (0 = never)
    pub log_every: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_epochs: 1000,
            log_every: 100,
        }
    }
}

/// Errors for one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_error: f64,
    pub validation_error: Option<f64>,
}

/// Outcome of [`fit`]
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub config: FitConfig,
    pub epochs: Vec<EpochMetrics>,
    /// Epoch at which the stop criterion fired
    pub converged_epoch: Option<usize>,
    pub elapsed_ms: u128,
}

impl FitReport {
    pub fn final_train_error(&self) -> Option<f64> {
        self.epochs.last().map(|m| m.train_error)
    }

    pub fn final_validation_error(&self) -> Option<f64> {
        self.epochs.last().and_then(|m| m.validation_error)
    }

    /// Epoch with the lowest validation error, if a validation set was used
    pub fn best_validation_epoch(&self) -> Option<&EpochMetrics> {
        self.epochs
            .iter()
            .filter(|m| m.validation_error.is_some())
            .min_by(|a, b| {
                a.validation_error
                    .partial_cmp(&b.validation_error)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Train until the scheme stops or `max_epochs` is reached.
///
/// `validation` is an optional held-out `(inputs, targets)` batch evaluated
/// after every step without training on it. Any step error aborts the loop.
pub fn fit<T, R>(
    training: &mut T,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    rules: &mut [R],
    validation: Option<(&[Vec<f64>], &[Vec<f64>])>,
    config: FitConfig,
) -> Result<FitReport>
where
    T: Training,
    R: Rule,
{
    let start = Instant::now();
    let mut epochs = Vec::new();
    let mut converged_epoch = None;

    for epoch in 0..config.max_epochs {
        let train_error = training.iteration(inputs, targets, rules)?;
        let validation_error = match validation {
            Some((x, y)) => Some(training.error(x, y, rules)?),
            None => None,
        };

        if config.log_every > 0 && epoch % config.log_every == 0 {
            match validation_error {
                Some(v) => log::info!(
                    "epoch {}: train {:.6e}, validation {:.6e}",
                    epoch,
                    train_error,
                    v
                ),
                None => log::info!("epoch {}: train {:.6e}", epoch, train_error),
            }
        }

        epochs.push(EpochMetrics {
            epoch,
            train_error,
            validation_error,
        });

        if training.is_training_stopped() {
            log::info!("training stopped at epoch {}", epoch);
            converged_epoch = Some(epoch);
            break;
        }
    }

    Ok(FitReport {
        config,
        epochs,
        converged_epoch,
        elapsed_ms: start.elapsed().as_millis(),
    })
}
