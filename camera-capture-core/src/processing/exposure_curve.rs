//! Gesture → exposure mapping.

use std::time::Duration;

/// Exponent applied to the exposure value before interpolating durations;
/// expands the usable range at the short end.
pub const EXPOSURE_GAIN_EXPONENT: f64 = 4.0;

/// Hard floor for the custom exposure duration (1/2000 s).
pub const MINIMUM_EXPOSURE_DURATION: Duration = Duration::from_micros(500);

/// Drag distance, in points, that spans half the exposure range.
pub const EXPOSURE_DRAG_RANGE: f64 = 400.0;

/// Neutral exposure value.
pub const NEUTRAL_EXPOSURE: f64 = 0.5;

/// Map an accumulated vertical drag distance to an exposure value in [0, 1].
///
/// Negative distance (dragging up) brightens. NaN is treated as no drag.
pub fn exposure_value_for_distance(distance: f64) -> f64 {
    if distance.is_nan() || distance == 0.0 {
        return NEUTRAL_EXPOSURE;
    }
    let magnitude = (distance.abs() / EXPOSURE_DRAG_RANGE).min(1.0);
    let direction = if distance < 0.0 { 1.0 } else { -1.0 };
    NEUTRAL_EXPOSURE + direction * magnitude * 0.5
}

/// Interpolate a custom exposure duration for `value` between the device's
/// range, with the minimum floored at `MINIMUM_EXPOSURE_DURATION`.
pub fn exposure_duration_for_value(value: f64, min: Duration, max: Duration) -> Duration {
    let value = if value.is_nan() { NEUTRAL_EXPOSURE } else { value.clamp(0.0, 1.0) };
    let p = value.powf(EXPOSURE_GAIN_EXPONENT);
    let min_secs = min.max(MINIMUM_EXPOSURE_DURATION).as_secs_f64();
    let max_secs = max.as_secs_f64().max(min_secs);
    // Ranges near Duration::MAX lose precision in f64 and can round past it.
    Duration::try_from_secs_f64(min_secs + p * (max_secs - min_secs))
        .unwrap_or_else(|_| max.max(min).max(MINIMUM_EXPOSURE_DURATION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unrepresentable_range_falls_back_to_the_maximum() {
        assert_eq!(
            exposure_duration_for_value(1.0, Duration::ZERO, Duration::MAX),
            Duration::MAX
        );
        assert!(exposure_duration_for_value(0.0, Duration::ZERO, Duration::MAX) < Duration::from_secs(1));
    }

    #[test]
    fn zero_distance_is_neutral() {
        assert_eq!(exposure_value_for_distance(0.0), 0.5);
        assert_eq!(exposure_value_for_distance(-0.0), 0.5);
        assert_eq!(exposure_value_for_distance(f64::NAN), 0.5);
    }

    #[test]
    fn dragging_up_brightens() {
        assert_relative_eq!(exposure_value_for_distance(-200.0), 0.75);
        assert_relative_eq!(exposure_value_for_distance(-400.0), 1.0);
        assert_relative_eq!(exposure_value_for_distance(200.0), 0.25);
        assert_relative_eq!(exposure_value_for_distance(400.0), 0.0);
    }

    #[test]
    fn value_saturates_past_range() {
        assert_eq!(exposure_value_for_distance(-10_000.0), 1.0);
        assert_eq!(exposure_value_for_distance(10_000.0), 0.0);
        assert_eq!(exposure_value_for_distance(f64::NEG_INFINITY), 1.0);
        assert_eq!(exposure_value_for_distance(f64::INFINITY), 0.0);
    }

    #[test]
    fn mapping_is_monotonic_and_bounded() {
        let mut previous = f64::INFINITY;
        let mut distance = -1_000.0;
        while distance <= 1_000.0 {
            let value = exposure_value_for_distance(distance);
            assert!((0.0..=1.0).contains(&value));
            assert!(value <= previous, "not non-increasing at {}", distance);
            previous = value;
            distance += 7.5;
        }
    }

    #[test]
    fn duration_spans_floored_range() {
        let min = Duration::from_micros(100);
        let max = Duration::from_millis(500);

        let shortest = exposure_duration_for_value(0.0, min, max);
        assert_relative_eq!(shortest.as_secs_f64(), MINIMUM_EXPOSURE_DURATION.as_secs_f64(), epsilon = 1e-8);

        let longest = exposure_duration_for_value(1.0, min, max);
        assert_relative_eq!(longest.as_secs_f64(), 0.5, epsilon = 1e-8);
    }

    #[test]
    fn duration_applies_gain_curve() {
        let min = Duration::from_millis(1);
        let max = Duration::from_millis(101);
        let mid = exposure_duration_for_value(0.5, min, max);
        // 0.5^4 = 0.0625 of the 100 ms span
        assert_relative_eq!(mid.as_secs_f64(), 0.001 + 0.00625, epsilon = 1e-8);
    }

    #[test]
    fn inverted_range_collapses_to_floor() {
        let duration = exposure_duration_for_value(1.0, Duration::from_millis(10), Duration::from_millis(1));
        assert_relative_eq!(duration.as_secs_f64(), 0.01, epsilon = 1e-8);
    }
}
