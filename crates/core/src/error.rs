//! Configuration errors
//!
//! Only construction-time configuration can fail with an error value. Runtime mutators
//! assert their preconditions in debug builds and clamp in release builds, and numerical
//! invariants are internal assertions rather than errors.

use thiserror::Error;

/// Errors raised while validating or loading a [`ModelConfig`](crate::ModelConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A scalar parameter lies outside its permitted range.
    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        /// Parameter name as it appears in the configuration
        name: &'static str,
        /// Rejected value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// More layers were requested active than the model allocates.
    #[error("requested {requested} active atmosphere layers but only {capacity} are allocated")]
    TooManyActiveLayers {
        /// Requested active layer count
        requested: usize,
        /// Allocated layer count
        capacity: usize,
    },

    /// The layer capacity exceeds what the model supports.
    #[error("atmosphere layer capacity {requested} exceeds the supported maximum of {max}")]
    TooManyLayers {
        /// Requested capacity
        requested: usize,
        /// Supported maximum
        max: usize,
    },

    /// The integration sub-step is not usable.
    #[error("maximum time step must be finite and in (0, {max}], got {value}")]
    InvalidTimeStep {
        /// Rejected step
        value: f64,
        /// Largest stable step
        max: f64,
    },

    /// A JSON configuration document could not be parsed.
    #[error("invalid model configuration JSON")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Check that `value` is finite and within `[min, max]`.
    pub(crate) fn check_range(
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ConfigError> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                name,
                value,
                min,
                max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_accepts_bounds() {
        assert!(ConfigError::check_range("albedo", 0.0, 0.0, 1.0).is_ok());
        assert!(ConfigError::check_range("albedo", 1.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_check_range_rejects_nan_and_outside() {
        assert!(matches!(
            ConfigError::check_range("albedo", f64::NAN, 0.0, 1.0),
            Err(ConfigError::OutOfRange { name: "albedo", .. })
        ));
        let err = ConfigError::check_range("albedo", 1.2, 0.0, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "albedo must lie in [0, 1], got 1.2");
    }
}
