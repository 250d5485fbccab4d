//! Display-safe progress values.
//!
//! The raw `progress` of a [`JobStatus`](crate::job_status::JobStatus) is
//! never modified; everything here derives presentation numbers from it.

/// Minimum rendered bar width in percent, so an idle job still shows a
/// visible sliver.
pub const MIN_BAR_WIDTH_PERCENT: f64 = 3.0;

/// Above this fraction the percentage label fits inside the bar.
pub const INLINE_LABEL_THRESHOLD: f64 = 0.05;

/// Clamp a raw progress fraction into `[0, 1]`. NaN reads as zero.
pub fn clamp_fraction(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Rounded percentage in `[0, 100]`.
pub fn percent(raw: f64) -> u8 {
    (clamp_fraction(raw) * 100.0).round() as u8
}

/// Width of the progress bar in percent, floored at
/// [`MIN_BAR_WIDTH_PERCENT`].
pub fn bar_width_percent(raw: f64) -> f64 {
    (clamp_fraction(raw) * 100.0).max(MIN_BAR_WIDTH_PERCENT)
}

/// Whether the percentage label is drawn inside the bar rather than
/// centred over the track.
pub fn label_inside_bar(raw: f64) -> bool {
    clamp_fraction(raw) > INLINE_LABEL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_in_range_values() {
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(0.42), 42);
        assert_eq!(percent(1.0), 100);
    }

    #[test]
    fn percent_clamps_out_of_range_values() {
        assert_eq!(percent(-0.2), 0);
        assert_eq!(percent(1.0000002), 100);
        assert_eq!(percent(7.5), 100);
        assert_eq!(percent(f64::NEG_INFINITY), 0);
        assert_eq!(percent(f64::INFINITY), 100);
        assert_eq!(percent(f64::NAN), 0);
    }

    #[test]
    fn bar_width_has_visible_floor() {
        assert_eq!(bar_width_percent(0.0), MIN_BAR_WIDTH_PERCENT);
        assert_eq!(bar_width_percent(-1.0), MIN_BAR_WIDTH_PERCENT);
        assert_eq!(bar_width_percent(0.01), MIN_BAR_WIDTH_PERCENT);
        assert_eq!(bar_width_percent(0.5), 50.0);
        assert_eq!(bar_width_percent(3.0), 100.0);
    }

    #[test]
    fn label_placement_switches_above_five_percent() {
        assert!(!label_inside_bar(0.0));
        assert!(!label_inside_bar(0.05));
        assert!(label_inside_bar(0.06));
        assert!(label_inside_bar(2.0));
    }
}
