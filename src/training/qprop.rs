//! QProp training session
//!
//! One [`QPropTraining`] owns the adaptive-rate state of one model. Each
//! [`QPropTraining::run_iteration`] call consumes a full batch:
//!
//! 1. Validate batch and rule shapes (nothing is mutated on failure)
//! 2. Accumulate premise and consequent gradients over the batch
//! 3. Allocate rates on the first call, then grow/shrink/reset them from the
//!    previous batch gradient
//! 4. Apply `param -= rate * gradient` to every rule in place
//! 5. Feed the mean absolute error to the convergence monitor
//!
//! A session is `Send` but not shared: train independent models concurrently
//! by moving one session per model into its own thread.

use std::fmt;

use crate::error::{AnfisError, Result};
use crate::inference::{infer_sample, output_dim};
use crate::rule::Rule;

use super::convergence::ConvergenceMonitor;
use super::gradient::{accumulate, BatchGradients};
use super::rates::{AdaptiveRates, ParamTable, RateUpdateStats};
use super::{QPropConfig, Training};

/// Summary of one training step, handed to the gradient observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// 1-based step count within the session
    pub iteration: u64,
    pub mean_error: f64,
    /// Largest |dE/dp| contribution of a single sample
    pub max_premise_partial: f64,
    pub rate_updates: RateUpdateStats,
    pub stopped: bool,
}

type Observer = Box<dyn FnMut(&StepReport) + Send>;

/// Resilient adaptive-rate trainer for a rule base
pub struct QPropTraining {
    config: QPropConfig,
    /// Allocated on the first successful step
    rates: Option<AdaptiveRates>,
    /// (premise, consequent) gradients of the previous step
    previous: Option<(ParamTable, ParamTable)>,
    monitor: ConvergenceMonitor,
    iterations: u64,
    observer: Option<Observer>,
}

impl QPropTraining {
    /// Create a session; fails with `Config` if `config` does not validate
    pub fn new(config: QPropConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: QPropConfig) -> Self {
        let monitor = ConvergenceMonitor::new(config.absolute_tolerance, config.relative_tolerance);
        Self {
            config,
            rates: None,
            previous: None,
            monitor,
            iterations: 0,
            observer: None,
        }
    }

    pub fn config(&self) -> &QPropConfig {
        &self.config
    }

    /// Completed training steps
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Premise-parameter rates, `None` before the first step
    pub fn premise_rates(&self) -> Option<&ParamTable> {
        self.rates.as_ref().map(|r| &r.premise)
    }

    /// Consequent rates, `None` before the first step
    pub fn consequent_rates(&self) -> Option<&ParamTable> {
        self.rates.as_ref().map(|r| &r.consequent)
    }

    /// Error observed by the last step, `f64::MAX` before the first
    pub fn last_error(&self) -> f64 {
        self.monitor.last_error()
    }

    /// Called once per successful step with its [`StepReport`]
    pub fn set_gradient_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&StepReport) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_gradient_observer(&mut self) {
        self.observer = None;
    }

    pub fn is_training_stopped(&self) -> bool {
        self.monitor.should_stop()
    }

    /// Run one training step over the batch and return its mean absolute error.
    ///
    /// Every rule must fire for every input (non-zero total membership);
    /// otherwise the step fails with `ZeroFiring` before anything changes.
    pub fn run_iteration<R: Rule>(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rules: &mut [R],
    ) -> Result<f64> {
        let output_dim = check_batch(inputs, targets, rules)?;
        if inputs.is_empty() {
            return Err(AnfisError::shape("batch size", 1, 0));
        }
        let premise_lens: Vec<usize> = rules.iter().map(|r| r.parameters().len()).collect();
        if let Some(rates) = &self.rates {
            check_shape(rates, &premise_lens, output_dim)?;
        }

        let grads = accumulate(inputs, targets, rules, &premise_lens, output_dim)?;

        let initial = self.config.initial_learning_rate;
        let rates = self
            .rates
            .get_or_insert_with(|| AdaptiveRates::new(&premise_lens, output_dim, initial));
        let previous = self.previous.as_ref().map(|(p, z)| (p, z));
        let rate_updates = rates.update(&grads.premise, &grads.consequent, previous, &self.config);

        apply_update(rules, rates, &grads);

        let mean_error = grads.global_error / inputs.len() as f64;
        let stopped = self.monitor.observe(mean_error);
        self.iterations += 1;

        let report = StepReport {
            iteration: self.iterations,
            mean_error,
            max_premise_partial: grads.max_premise_partial,
            rate_updates,
            stopped,
        };
        self.log_step(&report);
        if let Some(observer) = self.observer.as_mut() {
            observer(&report);
        }

        self.previous = Some((grads.premise, grads.consequent));
        Ok(mean_error)
    }

    /// Mean absolute error of the model on the batch; touches no state.
    pub fn evaluate_error<R: Rule>(
        &self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rules: &[R],
    ) -> Result<f64> {
        let output_dim = check_batch(inputs, targets, rules)?;
        if inputs.is_empty() {
            return Ok(0.0);
        }

        let mut global_error = 0.0;
        for (sample, (input, target)) in inputs.iter().zip(targets).enumerate() {
            let o = infer_sample(input, rules, output_dim, sample)?;
            global_error += o
                .iter()
                .zip(target)
                .map(|(o, t)| (o - t).abs())
                .sum::<f64>();
        }
        Ok(global_error / inputs.len() as f64)
    }

    fn log_step(&self, report: &StepReport) {
        log::debug!(
            "qprop step {}: mean error {:.6e}, stop={}",
            report.iteration,
            report.mean_error,
            report.stopped
        );
        log::trace!(
            "qprop step {} rates: {} grown, {} shrunk, {} reset",
            report.iteration,
            report.rate_updates.grown,
            report.rate_updates.shrunk,
            report.rate_updates.reset
        );
        if report.max_premise_partial > self.config.gradient_warn_threshold {
            log::warn!(
                "qprop step {}: premise partial {:.3e} exceeds {}",
                report.iteration,
                report.max_premise_partial,
                self.config.gradient_warn_threshold
            );
        }
    }
}

impl Default for QPropTraining {
    fn default() -> Self {
        Self::with_valid_config(QPropConfig::default())
    }
}

impl fmt::Debug for QPropTraining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QPropTraining")
            .field("config", &self.config)
            .field("rates", &self.rates)
            .field("monitor", &self.monitor)
            .field("iterations", &self.iterations)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Training for QPropTraining {
    fn iteration<R: Rule>(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rules: &mut [R],
    ) -> Result<f64> {
        self.run_iteration(inputs, targets, rules)
    }

    fn error<R: Rule>(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>], rules: &[R]) -> Result<f64> {
        self.evaluate_error(inputs, targets, rules)
    }

    fn is_training_stopped(&self) -> bool {
        QPropTraining::is_training_stopped(self)
    }
}

/// Batch and rule-base checks shared by training and evaluation.
/// Returns the output dimension.
fn check_batch<R: Rule>(inputs: &[Vec<f64>], targets: &[Vec<f64>], rules: &[R]) -> Result<usize> {
    if inputs.len() != targets.len() {
        return Err(AnfisError::shape("batch length", inputs.len(), targets.len()));
    }
    let dim = output_dim(rules)?;
    if let Some(target) = targets.iter().find(|t| t.len() != dim) {
        return Err(AnfisError::shape("target length", dim, target.len()));
    }
    Ok(dim)
}

/// The session never resizes its rate tables after the first step
fn check_shape(rates: &AdaptiveRates, premise_lens: &[usize], output_dim: usize) -> Result<()> {
    let recorded = rates.premise.row_lens();
    if recorded != premise_lens {
        return Err(AnfisError::InvalidModel(format!(
            "rule parameter counts changed from {:?} to {:?}",
            recorded, premise_lens
        )));
    }
    let recorded_dim = rates.consequent.row_len(0);
    if recorded_dim != output_dim {
        return Err(AnfisError::InvalidModel(format!(
            "output dimension changed from {} to {}",
            recorded_dim, output_dim
        )));
    }
    Ok(())
}

fn apply_update<R: Rule>(rules: &mut [R], rates: &AdaptiveRates, grads: &BatchGradients) {
    for (r, rule) in rules.iter_mut().enumerate() {
        for ((p, &lr), &g) in rule
            .parameters_mut()
            .iter_mut()
            .zip(rates.premise.row(r))
            .zip(grads.premise.row(r))
        {
            *p -= lr * g;
        }
        for ((z, &lr), &g) in rule
            .consequent_mut()
            .iter_mut()
            .zip(rates.consequent.row(r))
            .zip(grads.consequent.row(r))
        {
            *z -= lr * g;
        }
    }
}
