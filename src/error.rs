// src/error.rs
use thiserror::Error;

/// Error taxonomy for the simulation engine.
///
/// None of these abort a run trigger. Run triggers recover locally and hand
/// the recovered errors to the sink as notices (see `RunOutput::notices`);
/// only the strict `validate()` methods return them as `Err`.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimError {
    /// Non-numeric, negative or out-of-domain input
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameter {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Zero variance or zero/one probability edge case
    #[error("Degenerate {distribution} distribution: {reason}")]
    DegenerateDistribution {
        distribution: String,
        reason: String,
    },

    /// More items requested than a cap allows
    #[error("Capacity exceeded for {what}: requested {requested}, cap {cap}")]
    CapacityExceeded {
        what: String,
        requested: u64,
        cap: u64,
    },
}

/// Result type alias for stochastic-lab operations
pub type SimResult<T> = Result<T, SimError>;

/// Validation and sanitisation utilities
///
/// The `validate_*` functions are strict checks. The `sanitize_*` functions
/// never fail: they return the value to use together with the error that was
/// recovered from, if any.
pub mod validation {
    use super::{SimError, SimResult};
    use tracing::warn;

    fn invalid(name: &str, value: f64, constraint: &str) -> SimError {
        SimError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: constraint.to_string(),
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SimResult<()> {
        if !value.is_finite() {
            Err(invalid(name, value, "must be finite (not NaN or infinite)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(invalid(name, value, "must be positive (> 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(invalid(name, value, "must be non-negative (≥ 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate a probability in [0, 1]
    pub fn validate_probability(name: &str, value: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if !(0.0..=1.0).contains(&value) {
            Err(invalid(name, value, "must be in range [0, 1]"))
        } else {
            Ok(())
        }
    }

    /// Validate a count in [1, max]
    pub fn validate_count(name: &str, value: usize, max: usize) -> SimResult<()> {
        if value == 0 {
            Err(invalid(name, value as f64, "must be at least 1"))
        } else if value > max {
            Err(invalid(name, value as f64, &format!("exceeds maximum allowed ({})", max)))
        } else {
            Ok(())
        }
    }

    /// Clamp a probability into [0, 1]; NaN falls back to `default`
    pub fn sanitize_probability(name: &str, value: f64, default: f64) -> (f64, Option<SimError>) {
        if value.is_nan() {
            warn!(parameter = name, value, default, "probability is NaN, using default");
            return (default, Some(invalid(name, value, "not a number, default used")));
        }
        if (0.0..=1.0).contains(&value) {
            return (value, None);
        }
        let clamped = value.clamp(0.0, 1.0);
        warn!(parameter = name, value, clamped, "probability clamped to [0, 1]");
        (clamped, Some(invalid(name, value, "clamped to [0, 1]")))
    }

    /// Clamp a count into [1, max]
    pub fn sanitize_count(name: &str, value: usize, max: usize) -> (usize, Option<SimError>) {
        match validate_count(name, value, max) {
            Ok(()) => (value, None),
            Err(err) => {
                let clamped = value.clamp(1, max);
                warn!(parameter = name, value, clamped, "count clamped");
                (clamped, Some(err))
            }
        }
    }

    /// Any finite real; NaN and infinities fall back to `default`
    pub fn sanitize_finite(name: &str, value: f64, default: f64) -> (f64, Option<SimError>) {
        match validate_finite(name, value) {
            Ok(()) => (value, None),
            Err(err) => {
                warn!(parameter = name, value, default, "non-finite value, using default");
                (default, Some(err))
            }
        }
    }

    /// Magnitude of a finite real (negative values are mirrored);
    /// non-finite values fall back to `default`
    pub fn sanitize_magnitude(name: &str, value: f64, default: f64) -> (f64, Option<SimError>) {
        if !value.is_finite() {
            warn!(parameter = name, value, default, "non-finite value, using default");
            return (default, Some(invalid(name, value, "must be finite, default used")));
        }
        if value < 0.0 {
            warn!(parameter = name, value, "negative value mirrored");
            return (-value, Some(invalid(name, value, "must be non-negative, absolute value used")));
        }
        (value, None)
    }

    /// Strictly positive real: negative values are mirrored, zero and
    /// non-finite values fall back to `default`
    pub fn sanitize_positive(name: &str, value: f64, default: f64) -> (f64, Option<SimError>) {
        let (magnitude, err) = sanitize_magnitude(name, value, default);
        if magnitude == 0.0 {
            warn!(parameter = name, default, "zero value, using default");
            return (default, Some(invalid(name, value, "must be positive, default used")));
        }
        (magnitude, err)
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("horizon", 0.2).is_ok());
        assert!(validate_positive("horizon", 0.0).is_err());
        assert!(validate_positive("horizon", -0.1).is_err());
        assert!(validate_positive("horizon", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability("p", 0.0).is_ok());
        assert!(validate_probability("p", 1.0).is_ok());
        assert!(validate_probability("p", 1.01).is_err());
        assert!(validate_probability("p", -0.01).is_err());
        assert!(validate_probability("p", f64::INFINITY).is_err());
    }

    #[test]
    fn test_sanitize_probability() {
        assert_eq!(sanitize_probability("p", 0.3, 0.5), (0.3, None));

        let (p, err) = sanitize_probability("p", 1.7, 0.5);
        assert_eq!(p, 1.0);
        assert!(matches!(err, Some(SimError::InvalidParameter { .. })));

        let (p, err) = sanitize_probability("p", -2.0, 0.5);
        assert_eq!(p, 0.0);
        assert!(err.is_some());

        let (p, err) = sanitize_probability("p", f64::NAN, 0.5);
        assert_eq!(p, 0.5);
        assert!(err.is_some());
    }

    #[test]
    fn test_sanitize_count() {
        assert_eq!(sanitize_count("trials", 5, 100), (5, None));
        assert_eq!(sanitize_count("trials", 0, 100).0, 1);
        assert_eq!(sanitize_count("trials", 500, 100).0, 100);
    }

    #[test]
    fn test_sanitize_positive() {
        assert_eq!(sanitize_positive("horizon", 2.0, 10.0), (2.0, None));
        assert_eq!(sanitize_positive("horizon", -2.0, 10.0).0, 2.0);
        assert_eq!(sanitize_positive("horizon", 0.0, 10.0).0, 10.0);
        assert_eq!(sanitize_positive("horizon", f64::NAN, 10.0).0, 10.0);
    }

    #[test]
    fn test_error_display() {
        let error = SimError::InvalidParameter {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be non-negative".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("non-negative"));

        let error = SimError::CapacityExceeded {
            what: "displayed trajectories".to_string(),
            requested: 16384,
            cap: 5000,
        };
        let display = format!("{}", error);
        assert!(display.contains("16384"));
        assert!(display.contains("5000"));
    }
}
