//! # Training
//!
//! Resilient adaptive-rate ("QProp") training of ANFIS rule bases.
//!
//! ## Pieces
//!
//! - [`QPropConfig`]: tolerances, growth/shrink factors, rate bounds
//! - [`gradient`]: batch accumulation of premise and consequent gradients
//! - [`rates`]: per-parameter learning rates and the sign-agreement update
//! - [`convergence`]: absolute/relative stop criterion
//! - [`QPropTraining`]: the session that ties them together
//! - [`fit`]: epoch loop over any [`Training`] scheme
//!
//! ## Example
//!
//! ```
//! use anfis_qprop::{GaussianRule, QPropConfig, QPropTraining};
//!
//! let mut rules = vec![
//!     GaussianRule::new(vec![-1.0], vec![0.8], vec![0.0]),
//!     GaussianRule::new(vec![1.0], vec![0.8], vec![0.0]),
//! ];
//! let inputs = vec![vec![-1.0], vec![0.0], vec![1.0]];
//! let targets = vec![vec![-1.0], vec![0.0], vec![1.0]];
//!
//! let mut training = QPropTraining::new(QPropConfig::aggressive()).unwrap();
//! let first = training.run_iteration(&inputs, &targets, &mut rules).unwrap();
//! let second = training.run_iteration(&inputs, &targets, &mut rules).unwrap();
//! assert!(second < first);
//! ```

mod config;
pub mod convergence;
pub mod fit;
pub mod gradient;
mod qprop;
pub mod rates;

pub use config::QPropConfig;
pub use convergence::ConvergenceMonitor;
pub use fit::{fit, FitConfig, FitReport};
pub use gradient::BatchGradients;
pub use qprop::{QPropTraining, StepReport};
pub use rates::{AdaptiveRates, ParamTable, RateUpdateStats};

use crate::error::Result;
use crate::rule::Rule;

/// A batch training scheme with a stop criterion
pub trait Training {
    /// One training step over the batch; returns the mean absolute error
    fn iteration<R: Rule>(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rules: &mut [R],
    ) -> Result<f64>;

    /// Mean absolute error without training
    fn error<R: Rule>(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>], rules: &[R]) -> Result<f64>;

    /// Whether the last step met the stop criterion
    fn is_training_stopped(&self) -> bool;
}
