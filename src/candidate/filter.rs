//! Score filtering ahead of NMS.
//!
//! Dropping sub-threshold candidates here bounds the quadratic NMS input;
//! it never changes which boxes would survive suppression.

/// Keep decision for a candidate score: strictly greater than the
/// threshold. NaN scores never pass.
#[inline]
pub(crate) fn keep_score(score: f32, threshold: f32) -> bool {
    score > threshold
}

#[cfg(test)]
mod tests {
    use super::keep_score;

    #[test]
    fn threshold_is_strict() {
        assert!(keep_score(0.51, 0.5));
        assert!(!keep_score(0.5, 0.5));
        assert!(!keep_score(0.49, 0.5));
    }

    #[test]
    fn zero_threshold_keeps_positive_scores_only() {
        assert!(keep_score(1e-6, 0.0));
        assert!(!keep_score(0.0, 0.0));
        assert!(!keep_score(-0.1, 0.0));
    }

    #[test]
    fn nan_never_passes() {
        assert!(!keep_score(f32::NAN, 0.0));
        assert!(!keep_score(f32::NAN, 0.5));
    }
}
