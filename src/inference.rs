//! ANFIS inference - normalized firing-weighted blend of rule consequents

use crate::error::{AnfisError, Result};
use crate::rule::Rule;

/// Firing strength of every rule for `input`, plus their sum.
pub fn firing_strengths<R: Rule>(input: &[f64], rules: &[R]) -> (Vec<f64>, f64) {
    let firings: Vec<f64> = rules.iter().map(|r| r.membership(input)).collect();
    let sum = firings.iter().sum();
    (firings, sum)
}

/// Blend consequents by normalized firing: `o[C] = Σ_r (w_r / Σw) · z_r[C]`.
///
/// `firings` must be non-empty with a non-zero sum; `output_dim` is the
/// shared consequent length.
pub(crate) fn blend<R: Rule>(
    rules: &[R],
    firings: &[f64],
    firing_sum: f64,
    output_dim: usize,
) -> Vec<f64> {
    let mut out = vec![0.0; output_dim];
    for (rule, &w) in rules.iter().zip(firings) {
        let norm = w / firing_sum;
        for (o, &z) in out.iter_mut().zip(rule.consequent()) {
            *o += norm * z;
        }
    }
    out
}

/// Check that a rule base is usable and return its output dimension.
pub fn output_dim<R: Rule>(rules: &[R]) -> Result<usize> {
    let first = rules
        .first()
        .ok_or_else(|| AnfisError::InvalidModel("rule base is empty".into()))?;
    let dim = first.consequent().len();

    if let Some((i, rule)) = rules
        .iter()
        .enumerate()
        .find(|(_, r)| r.consequent().len() != dim)
    {
        return Err(AnfisError::InvalidModel(format!(
            "rule {} has {} outputs, rule 0 has {}",
            i,
            rule.consequent().len(),
            dim
        )));
    }
    Ok(dim)
}

/// Run the model on one input.
///
/// Fails with `InvalidModel` on an empty or inconsistent rule base, and with
/// `ZeroFiring` when no rule fires for `input`.
pub fn infer<R: Rule>(input: &[f64], rules: &[R]) -> Result<Vec<f64>> {
    let dim = output_dim(rules)?;
    infer_sample(input, rules, dim, 0)
}

/// `infer` for a rule base already checked by [`output_dim`]; firing errors
/// carry `sample` as their index.
pub(crate) fn infer_sample<R: Rule>(
    input: &[f64],
    rules: &[R],
    output_dim: usize,
    sample: usize,
) -> Result<Vec<f64>> {
    let (firings, sum) = firing_strengths(input, rules);
    check_firing_sum(sum, sample)?;
    Ok(blend(rules, &firings, sum, output_dim))
}

pub(crate) fn check_firing_sum(sum: f64, sample: usize) -> Result<()> {
    if !sum.is_finite() {
        return Err(AnfisError::NonFinite { sample });
    }
    if sum == 0.0 {
        return Err(AnfisError::ZeroFiring { sample });
    }
    Ok(())
}
