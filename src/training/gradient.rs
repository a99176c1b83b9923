//! Batch gradient accumulation
//!
//! For the blended output `o[C] = Σ_i (w_i / S) · z_i[C]` with `S = Σ_i w_i`,
//! the sensitivity of `o[C]` to premise parameter `p` of rule `r` is
//!
//! ```text
//! Σ_i ∂(w_i / S)/∂p · z_i[C]
//!   = ∂w_r/∂p · [ (S - w_r) z_r[C] - Σ_{i≠r} w_i z_i[C] ] / S²
//!   = ∂w_r/∂p · (z_r[C] - o[C]) / S
//! ```
//!
//! which is weighted by the error term `o[C] - t[C]` and summed over `C`.
//! Consequent sensitivities are `w_r / S`.

use crate::error::{AnfisError, Result};
use crate::inference::{blend, check_firing_sum, firing_strengths};
use crate::rule::Rule;

use super::ParamTable;

/// Gradients and error summed over one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchGradients {
    /// dE/dp per (rule, premise parameter)
    pub premise: ParamTable,
    /// dE/dz per (rule, output dimension)
    pub consequent: ParamTable,
    /// Σ_samples Σ_C |o[C] - t[C]|
    pub global_error: f64,
    /// Largest |dE/dp| contribution seen for a single sample
    pub max_premise_partial: f64,
    /// Batch size the sums were taken over
    pub samples: usize,
}

impl BatchGradients {
    /// Mean absolute error over the batch
    pub fn mean_error(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.global_error / self.samples as f64
        }
    }
}

/// Accumulate gradients over the whole batch without touching the rules.
///
/// `premise_lens` and `output_dim` must describe `rules`. Fails with
/// `ZeroFiring`/`NonFinite` if a sample's total firing is zero or not finite,
/// and with `InvalidModel` if a rule's gradient length disagrees with its
/// parameter count.
pub fn accumulate<R: Rule>(
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    rules: &[R],
    premise_lens: &[usize],
    output_dim: usize,
) -> Result<BatchGradients> {
    let consequent_lens = vec![output_dim; rules.len()];
    let mut premise = ParamTable::zeros(premise_lens);
    let mut consequent = ParamTable::zeros(&consequent_lens);
    let mut global_error = 0.0;
    let mut max_premise_partial: f64 = 0.0;

    let mut residual = vec![0.0; output_dim];

    for (sample, (input, target)) in inputs.iter().zip(targets).enumerate() {
        let (firings, firing_sum) = firing_strengths(input, rules);
        check_firing_sum(firing_sum, sample)?;

        let o = blend(rules, &firings, firing_sum, output_dim);
        for ((e, &oc), &tc) in residual.iter_mut().zip(&o).zip(target) {
            *e = oc - tc;
        }

        for (r, rule) in rules.iter().enumerate() {
            let grad = rule.gradient(input);
            if grad.len() != premise_lens[r] {
                return Err(AnfisError::InvalidModel(format!(
                    "rule {} returned {} partials for {} parameters",
                    r,
                    grad.len(),
                    premise_lens[r]
                )));
            }

            // Σ_C (o[C] - t[C]) · (z_r[C] - o[C]) / S, shared by every p
            let weight: f64 = residual
                .iter()
                .zip(rule.consequent())
                .zip(&o)
                .map(|((&e, &z), &oc)| e * (z - oc))
                .sum::<f64>()
                / firing_sum;

            for (acc, &g) in premise.row_mut(r).iter_mut().zip(&grad) {
                let partial = g * weight;
                max_premise_partial = max_premise_partial.max(partial.abs());
                *acc += partial;
            }

            let norm = firings[r] / firing_sum;
            for (acc, &e) in consequent.row_mut(r).iter_mut().zip(&residual) {
                *acc += e * norm;
            }
        }

        global_error += residual.iter().map(|e| e.abs()).sum::<f64>();
    }

    Ok(BatchGradients {
        premise,
        consequent,
        global_error,
        max_premise_partial,
        samples: inputs.len(),
    })
}
