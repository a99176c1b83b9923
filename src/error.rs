//! Error types for anfis-qprop

use thiserror::Error;

/// Training error type
#[derive(Debug, Error)]
pub enum AnfisError {
    /// Batch or vector lengths disagree
    #[error("Shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Empty rule set or rules with inconsistent shapes
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// No rule fires for a sample, so the normalized blend is undefined
    #[error("Zero total firing strength at sample {sample}")]
    ZeroFiring { sample: usize },

    /// Firing strengths produced NaN or infinity
    #[error("Non-finite firing strength at sample {sample}")]
    NonFinite { sample: usize },

    /// Rejected configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnfisError {
    pub(crate) fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnfisError>;
