//! Error types for the levitation field computation.

use thiserror::Error;

/// Errors raised while configuring or evaluating a levitator field.
#[derive(Debug, Error)]
pub enum LevitationError {
    /// A geometry, medium or discretization parameter is out of range.
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    Configuration {
        /// Name of the offending parameter
        parameter: &'static str,
        /// The rejected value
        value: f64,
        /// What the parameter must satisfy
        reason: &'static str,
    },

    /// The dense matrices would not fit in the configured memory budget.
    #[error(
        "grid needs about {required_mb:.1} MiB of dense matrices, limit is {limit_mb:.0} MiB",
        required_mb = mebibytes(.required_bytes),
        limit_mb = mebibytes(.limit_bytes)
    )]
    Resource {
        /// Estimated allocation in bytes (`usize::MAX` on overflow)
        required_bytes: usize,
        /// Configured limit in bytes
        limit_bytes: usize,
    },

    /// Two operands of a matrix product do not agree on their inner dimension.
    #[error("shape mismatch in {operation}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Which product or reshape was being validated
        operation: &'static str,
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        found: Vec<usize>,
    },

    /// An ndarray reshape failed.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// Drawing or writing an image failed.
    #[error("rendering failed: {0}")]
    Render(String),
}

fn mebibytes(bytes: &usize) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// A specialized `Result` type for levitation computations.
pub type Result<T> = std::result::Result<T, LevitationError>;

impl LevitationError {
    /// Shorthand for a [`LevitationError::Configuration`].
    pub fn config(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        LevitationError::Configuration {
            parameter,
            value,
            reason,
        }
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, LevitationError::Configuration { .. })
    }

    /// Returns `true` if this is a resource error.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, LevitationError::Resource { .. })
    }

    /// Returns `true` if this is a shape mismatch.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, LevitationError::ShapeMismatch { .. })
    }
}

/// Fails with [`LevitationError::ShapeMismatch`] unless `found == expected`.
pub(crate) fn ensure_shape(
    operation: &'static str,
    expected: &[usize],
    found: &[usize],
) -> Result<()> {
    if expected != found {
        return Err(LevitationError::ShapeMismatch {
            operation,
            expected: expected.to_vec(),
            found: found.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_message_in_mebibytes() {
        let err = LevitationError::Resource {
            required_bytes: 3 * 1024 * 1024,
            limit_bytes: 2 * 1024 * 1024,
        };
        assert_eq!(
            err.to_string(),
            "grid needs about 3.0 MiB of dense matrices, limit is 2 MiB"
        );
        assert!(err.is_resource_error());
    }

    #[test]
    fn test_ensure_shape() {
        assert!(ensure_shape("T_tf * U", &[4, 3], &[4, 3]).is_ok());
        let err = ensure_shape("T_tf * U", &[4, 3], &[4, 2]).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert!(err.to_string().contains("T_tf * U"));
    }
}
