//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Floor a f64 and clamp it to the u64 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    cast::<f64, u64>(value.min(max).floor()).unwrap_or(0)
}

/// Ceil a f64 and clamp it to the u64 range, returning 0 for non-finite values.
#[must_use]
pub fn ceil_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    cast::<f64, u64>(value.min(max).ceil()).unwrap_or(0)
}

/// Ratio of two millisecond spans clamped to `[0, 1]`.
///
/// A non-positive denominator means the span has already elapsed and yields 1.
#[must_use]
pub fn unit_ratio(elapsed_ms: i64, total_ms: i64) -> f64 {
    if total_ms <= 0 {
        return 1.0;
    }
    (i64_to_f64(elapsed_ms) / i64_to_f64(total_ms)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounders_handle_non_finite() {
        assert_eq!(floor_f64_to_u64(f64::NAN), 0);
        assert_eq!(ceil_f64_to_u64(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_u64(-3.2), 0);
        assert_eq!(floor_f64_to_u64(2.9), 2);
        assert_eq!(ceil_f64_to_u64(2.1), 3);
    }

    #[test]
    fn unit_ratio_clamps_and_handles_empty_spans() {
        assert!((unit_ratio(5, 10) - 0.5).abs() < f64::EPSILON);
        assert!((unit_ratio(-5, 10)).abs() < f64::EPSILON);
        assert!((unit_ratio(50, 10) - 1.0).abs() < f64::EPSILON);
        assert!((unit_ratio(0, 0) - 1.0).abs() < f64::EPSILON);
    }
}
