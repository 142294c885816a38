//! Numeric and naming helpers shared by widgets and the document engine.

use crate::error::NormalizeError;

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(value.min(max))
}

/// Linear remap from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Callers guarantee `in_min != in_max`; use [`normalize`] when the input
/// range comes from user data.
pub fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Remap `value` from `[min, max]` into `[0, 1]`.
pub fn normalize(value: f64, min: f64, max: f64) -> Result<f64, NormalizeError> {
    guard_range(min, max)?;
    Ok(remap(value, min, max, 0.0, 1.0))
}

/// Remap a `[0, 1]` value back into `[min, max]`.
pub fn denormalize(normal: f64, min: f64, max: f64) -> Result<f64, NormalizeError> {
    guard_range(min, max)?;
    Ok(remap(normal, 0.0, 1.0, min, max))
}

#[allow(clippy::float_cmp)]
fn guard_range(min: f64, max: f64) -> Result<(), NormalizeError> {
    if min == max || !min.is_finite() || !max.is_finite() {
        return Err(NormalizeError::DegenerateRange { min, max });
    }
    Ok(())
}

/// Number of digits after the decimal point in the textual form of `increment`.
pub fn decimal_places(increment: f64) -> usize {
    let text = increment.to_string();
    text.split_once('.').map_or(0, |(_, fraction)| fraction.len())
}

/// Snap `value` to the nearest multiple of `increment`.
///
/// The result is rounded to the increment's decimal places so that
/// `0.567` with increment `0.01` lands on `0.57` exactly.
pub fn snap_to_increment(value: f64, increment: f64) -> f64 {
    if increment <= 0.0 || !increment.is_finite() {
        return value;
    }
    let snapped = (value / increment).round() * increment;
    round_to_places(snapped, decimal_places(increment))
}

fn round_to_places(value: f64, places: usize) -> f64 {
    let Ok(exponent) = i32::try_from(places) else {
        return value;
    };
    let factor = 10f64.powi(exponent);
    (value * factor).round() / factor
}

/// Render `value` with the number of decimals implied by `increment`.
pub fn format_value(value: f64, increment: f64) -> String {
    format!("{value:.*}", decimal_places(increment))
}

/// Generate `prefix + N` with `N` starting at `existing.len() + 1`, skipping
/// every name already taken.
pub fn unique_channel<S: AsRef<str>>(prefix: &str, existing: &[S]) -> String {
    let mut index = existing.len() + 1;
    loop {
        let candidate = format!("{prefix}{index}");
        if !existing.iter().any(|name| name.as_ref() == candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Split a comma separated `items` property into trimmed entries.
pub fn parse_items(items: &str) -> Vec<String> {
    items
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_and_clamp_follow_linear_formula() {
        assert_eq!(remap(0.5, 0.0, 1.0, 0.0, 1.0), 0.5);
        assert_eq!(remap(5.0, 0.0, 10.0, 0.0, 1.0), 0.5);
        assert_eq!(remap(1.0, 0.0, 3.0, 0.0, 1.0), 1.0 / 3.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(4.0, 0.0, 10.0), 4.0);
    }

    #[test]
    fn normalize_rejects_zero_width_range() {
        assert_eq!(
            normalize(1.0, 2.0, 2.0),
            Err(NormalizeError::DegenerateRange { min: 2.0, max: 2.0 })
        );
        assert_eq!(normalize(20.0, 0.0, 40.0), Ok(0.5));
        assert_eq!(denormalize(0.25, 0.0, 40.0), Ok(10.0));
    }

    #[test]
    fn decimal_places_come_from_increment_text() {
        assert_eq!(decimal_places(0.01), 2);
        assert_eq!(decimal_places(0.001), 3);
        assert_eq!(decimal_places(1.0), 0);
        assert_eq!(decimal_places(0.5), 1);
    }

    #[test]
    fn snapping_lands_on_increment_grid() {
        assert_eq!(snap_to_increment(0.567, 0.01), 0.57);
        assert_eq!(snap_to_increment(0.3, 0.1), 0.3);
        assert_eq!(snap_to_increment(7.4, 1.0), 7.0);
        assert_eq!(snap_to_increment(0.123, 0.0), 0.123);
        assert_eq!(format_value(0.5, 0.001), "0.500");
    }

    #[test]
    fn unique_channel_starts_after_record_count() {
        let taken = ["rslider1", "rslider2", "rslider3", "rslider4"];
        assert_eq!(unique_channel("rslider", &taken), "rslider5");

        let taken = ["rslider1", "rslider2", "rslider5", "rslider4"];
        assert_eq!(unique_channel("rslider", &taken), "rslider6");

        let empty: [&str; 0] = [];
        assert_eq!(unique_channel("button", &empty), "button1");
    }

    #[test]
    fn items_are_trimmed() {
        assert_eq!(parse_items("One, Two,Three ,"), vec!["One", "Two", "Three"]);
        assert!(parse_items("").is_empty());
    }
}
