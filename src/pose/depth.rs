//! Apparent-size depth estimation.
//!
//! The detector gives no metric depth, so distance is inferred from how large
//! the palm appears: a hand spanning fewer image units than the calibrated
//! reference is further away.

use crate::landmarks::HandLandmarks;
use crate::MIN_HAND_SIZE;

/// Wrist to middle-knuckle span in normalised image units.
#[must_use]
pub fn hand_size(hand: &HandLandmarks) -> f32 {
    hand.middle_knuckle().distance(hand.wrist())
}

/// Converts a measured hand span into a depth offset.
///
/// `(base / size - 1) * scale`, with the ratio optionally clamped to
/// `limits`. Returns `None` for spans below [`MIN_HAND_SIZE`].
///
/// # Examples
/// ```
/// use shoal::pose::depth_from_hand_size;
///
/// assert_eq!(depth_from_hand_size(0.15, 0.15, 15.0, None), Some(0.0));
/// // Half the span reads as twice as far away.
/// assert_eq!(depth_from_hand_size(0.075, 0.15, 15.0, None), Some(15.0));
/// assert_eq!(depth_from_hand_size(0.0, 0.15, 15.0, None), None);
/// ```
#[must_use]
pub fn depth_from_hand_size(
    size: f32,
    base_size: f32,
    scale: f32,
    limits: Option<(f32, f32)>,
) -> Option<f32> {
    if !size.is_finite() || size < MIN_HAND_SIZE {
        return None;
    }
    let mut ratio = base_size / size;
    if let Some((lo, hi)) = limits {
        ratio = ratio.clamp(lo, hi);
    }
    Some((ratio - 1.0) * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    fn depth_is_non_increasing_in_hand_size() {
        let sizes: Vec<f32> = (1..200).map(|i| i as f32 * 0.002).collect();
        let depths: Vec<f32> = sizes
            .iter()
            .filter_map(|s| depth_from_hand_size(*s, 0.15, 15.0, Some((0.25, 4.0))))
            .collect();
        assert_eq!(depths.len(), sizes.len());
        assert!(depths.windows(2).all(|w| w[1] <= w[0]));
    }

    #[rstest]
    #[case::far(0.01, 45.0)]
    #[case::near(1.0, -11.25)]
    fn ratio_limits_bound_the_depth(#[case] size: f32, #[case] expected: f32) {
        let depth = depth_from_hand_size(size, 0.15, 15.0, Some((0.25, 4.0)));
        assert_relative_eq!(depth.unwrap_or(f32::NAN), expected, epsilon = 1e-4);
    }

    #[rstest]
    #[case::nan(f32::NAN)]
    #[case::tiny(1e-6)]
    fn degenerate_sizes_skip_the_update(#[case] size: f32) {
        assert_eq!(depth_from_hand_size(size, 0.15, 15.0, None), None);
    }
}
