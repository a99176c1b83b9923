//! # Fuzzy Rules
//!
//! A rule is anything that can report a firing strength for an input, the
//! gradient of that strength with respect to its own premise parameters, and
//! expose its premise parameters and consequent values for in-place updates.
//!
//! ## Families
//!
//! - **Gaussian**: product of per-dimension Gaussians `exp(-(x-c)²/2σ²)`
//! - **Bell**: product of generalized bells `1 / (1 + |(x-c)/a|^(2b))`
//!
//! The training core is generic over [`Rule`] and never looks at the family.
//!
//! ## Example
//!
//! ```
//! use anfis_qprop::{GaussianRule, Rule};
//!
//! let rule = GaussianRule::new(vec![0.0], vec![1.0], vec![2.5]);
//! assert!((rule.membership(&[0.0]) - 1.0).abs() < 1e-12);
//! assert_eq!(rule.gradient(&[0.3]).len(), rule.parameters().len());
//! ```

mod bell;
mod gaussian;

pub use bell::BellRule;
pub use gaussian::GaussianRule;

/// Capability set of a fuzzy rule.
///
/// `gradient(input)` must return one partial per entry of `parameters()`,
/// in the same order. `consequent()` has one value per output dimension and
/// every rule of a rule base must agree on that length.
pub trait Rule {
    /// Firing strength for `input`.
    ///
    /// The bundled families pair input values with their dimensions
    /// positionally and never panic on a length mismatch: dimensions without
    /// an input value drop out of the product (factor 1, zero partials) and
    /// surplus input values are ignored. `gradient` follows the same rule.
    fn membership(&self, input: &[f64]) -> f64;

    /// Partials of `membership(input)` w.r.t. each premise parameter
    fn gradient(&self, input: &[f64]) -> Vec<f64>;

    /// Premise parameters
    fn parameters(&self) -> &[f64];

    /// Premise parameters, mutable
    fn parameters_mut(&mut self) -> &mut [f64];

    /// Consequent output values, one per output dimension
    fn consequent(&self) -> &[f64];

    /// Consequent output values, mutable
    fn consequent_mut(&mut self) -> &mut [f64];
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    fn membership(&self, input: &[f64]) -> f64 {
        (**self).membership(input)
    }

    fn gradient(&self, input: &[f64]) -> Vec<f64> {
        (**self).gradient(input)
    }

    fn parameters(&self) -> &[f64] {
        (**self).parameters()
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        (**self).parameters_mut()
    }

    fn consequent(&self) -> &[f64] {
        (**self).consequent()
    }

    fn consequent_mut(&mut self) -> &mut [f64] {
        (**self).consequent_mut()
    }
}
