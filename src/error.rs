//! Error types shared by every module of the crate.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by network construction, training and the genetic operators
#[derive(Debug, Error)]
pub enum Error {
    /// Two shapes that must agree do not (layer widths, genome lengths, data rows)
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        found: String,
    },

    /// The operation is not defined for the given input (e.g. derivative of step)
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A trained-state query was made before any training call
    #[error("not trained: {0}")]
    NotTrained(String),

    /// Back-propagation primitives need the caches of a prior forward pass
    #[error("layer has no cached forward pass")]
    MissingForwardPass,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Shape mismatch between two `(rows, cols)` dimensions
    pub(crate) fn dims(
        context: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            context,
            expected: format!("{}x{}", expected.0, expected.1),
            found: format!("{}x{}", found.0, found.1),
        }
    }

    /// Shape mismatch between two lengths
    pub(crate) fn len(context: &'static str, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Reject probabilities outside `[0, 1]` (NaN included)
pub(crate) fn check_rate(name: &str, rate: f32) -> Result<()> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be within [0, 1], got {}",
            name, rate
        )))
    }
}
