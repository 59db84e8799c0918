//! Shared range-checking helpers.
//!
//! Return a plain message so that callers can wrap it in the error variant
//! matching their context: configuration code maps it to
//! [`EngineError::InvalidConfig`](crate::error::EngineError::InvalidConfig),
//! the measurement boundary to an upstream failure.

/// Validate that a value falls within `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be between 0.0 and 1.0, got {value}"));
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{name} must be a finite positive number, got {value}"));
    }
    Ok(())
}

/// Validate that a value is finite and not negative.
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be a finite non-negative number, got {value}"));
    }
    Ok(())
}

/// Validate that `low < high` (strict, so that adjacent windows cannot touch).
pub fn validate_strictly_below(low: f64, high: f64, low_name: &str, high_name: &str) -> Result<(), String> {
    match low.partial_cmp(&high) {
        Some(std::cmp::Ordering::Less) => Ok(()),
        _ => Err(format!("{low_name} ({low}) must be below {high_name} ({high})")),
    }
}
