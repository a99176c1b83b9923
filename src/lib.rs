//! # anfis-qprop - Adaptive-rate ANFIS training
//!
//! Trains the premise and consequent parameters of an ANFIS (Adaptive
//! Network-based Fuzzy Inference System) with a resilient, per-parameter
//! learning-rate scheme.
//!
//! ## Core Components
//!
//! - **Rule**: firing strength, its gradient, premise parameters, consequent
//! - **Inference**: normalized firing-weighted blend of rule consequents
//! - **QProp training**: batch gradients, sign-agreement rate adaptation,
//!   bounded in-place updates, absolute/relative stop criterion
//!
//! ## Rate Adaptation
//!
//! For every parameter, the product of this batch's gradient and the last one:
//!
//! 1. **Positive** - same direction, rate × `eta_plus` (capped at `delta_max`)
//! 2. **Negative** - overshoot, rate × `eta_minus` (floored at `delta_min`)
//! 3. **Zero** - restart from `delta_min`
//!
//! ## Example
//!
//! ```
//! use anfis_qprop::{infer, GaussianRule, QPropTraining};
//!
//! let mut rules = vec![GaussianRule::new(vec![0.0], vec![1.0], vec![0.0])];
//! let mut training = QPropTraining::default();
//!
//! let error = training
//!     .run_iteration(&[vec![0.5]], &[vec![2.0]], &mut rules)
//!     .unwrap();
//! assert_eq!(error, 2.0);
//! assert!(infer(&[0.5], &rules).unwrap()[0] > 0.0);
//! ```

// Fuzzy rule abstraction and families
pub mod rule;
pub use rule::{BellRule, GaussianRule, Rule};

// Inference collaborator
pub mod inference;
pub use inference::{firing_strengths, infer, output_dim};

// Adaptive-rate training
pub mod training;
pub use training::{
    fit, ConvergenceMonitor, FitConfig, FitReport, ParamTable, QPropConfig, QPropTraining,
    RateUpdateStats, StepReport, Training,
};

// Error types
mod error;
pub use error::{AnfisError, Result};
