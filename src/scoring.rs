//! Answer scoring against ground truth.
//!
//! Normalized string comparison with a numeric-tolerance fallback. The
//! scorer is total: numeric parse failures degrade to a string-mismatch
//! outcome, and nothing here can panic or return an error.

/// Default absolute tolerance for numeric comparison.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Normalize an answer for comparison: trim whitespace and lowercase.
fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Check whether a predicted answer matches the ground truth.
///
/// Both strings are normalized (trim + lowercase). Byte-equal normalized
/// strings are correct. Otherwise both are parsed as decimal numbers and
/// compared within `tolerance`; if either side fails to parse, the answer is
/// incorrect.
pub fn is_correct(predicted: &str, ground_truth: &str, tolerance: f64) -> bool {
    let pred_norm = normalize(predicted);
    let gt_norm = normalize(ground_truth);

    if pred_norm == gt_norm {
        return true;
    }

    match (pred_norm.parse::<f64>(), gt_norm.parse::<f64>()) {
        (Ok(pred_num), Ok(gt_num)) => (pred_num - gt_num).abs() <= tolerance,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(is_correct("42", "42", DEFAULT_TOLERANCE));
        assert!(is_correct("Paris", "Paris", DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_match_after_normalization() {
        assert!(is_correct("  Paris \n", "paris", DEFAULT_TOLERANCE));
        assert!(is_correct("YES", "yes", DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_numeric_within_tolerance() {
        assert!(is_correct("3.14159", "3.14", DEFAULT_TOLERANCE));
        assert!(is_correct("100.005", "100", DEFAULT_TOLERANCE));
        assert!(is_correct("42.0", "42", DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_numeric_outside_tolerance() {
        assert!(!is_correct("3.2", "3.5", DEFAULT_TOLERANCE));
        assert!(!is_correct("100.02", "100", DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_tolerance_boundary_inclusive() {
        assert!(is_correct("1.5", "1.0", 0.5));
    }

    #[test]
    fn test_non_numeric_mismatch() {
        assert!(!is_correct("Paris", "London", DEFAULT_TOLERANCE));
        assert!(!is_correct("42", "forty-two", DEFAULT_TOLERANCE));
        assert!(!is_correct("", "42", DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_custom_tolerance() {
        assert!(is_correct("105", "100", 5.0));
        assert!(!is_correct("106", "100", 5.0));
    }
}
