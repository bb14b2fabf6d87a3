//! Heuristic quality score shared by the summary strategies.

use super::types::compression_ratio;

/// Compression ratio the ratio score peaks at.
const OPTIMAL_RATIO: f64 = 0.3;
const PRESERVATION_WEIGHT: f64 = 0.6;
const RATIO_WEIGHT: f64 = 0.4;

/// Fraction of `preserve` entries found (case-insensitively) in `compressed`; 1.0 when empty.
pub fn preservation_ratio(compressed: &str, preserve: &[String]) -> f64 {
    if preserve.is_empty() {
        return 1.0;
    }
    let haystack = compressed.to_lowercase();
    let found = preserve
        .iter()
        .filter(|element| haystack.contains(&element.to_lowercase()))
        .count();
    found as f64 / preserve.len() as f64
}

/// Triangular score peaking at [`OPTIMAL_RATIO`], clamped to [0, 1].
pub fn ratio_score(ratio: f64) -> f64 {
    (1.0 - (OPTIMAL_RATIO - ratio).abs()).clamp(0.0, 1.0)
}

/// Weighted preservation and ratio score, rounded to three decimals.
pub fn quality_score(
    compressed: &str,
    original_tokens: usize,
    compressed_tokens: usize,
    preserve: &[String],
) -> f64 {
    let ratio = compression_ratio(compressed_tokens, original_tokens);
    let quality = preservation_ratio(compressed, preserve) * PRESERVATION_WEIGHT
        + ratio_score(ratio) * RATIO_WEIGHT;
    (quality * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_perfect_score() {
        let score = quality_score("Uses the REST API", 100, 30, &strings(&["api", "rest"]));
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_preservation() {
        let preserve = strings(&["API", "GraphQL"]);
        assert!((preservation_ratio("the api", &preserve) - 0.5).abs() < f64::EPSILON);
        // 0.5 * 0.6 + 1.0 * 0.4
        assert!((quality_score("the api", 100, 30, &preserve) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_score_shape() {
        assert!((ratio_score(0.3) - 1.0).abs() < f64::EPSILON);
        assert!((ratio_score(0.8) - 0.5).abs() < 1e-9);
        assert!((ratio_score(0.0) - 0.7).abs() < 1e-9);
        assert_eq!(ratio_score(2.0), 0.0);
    }

    #[test]
    fn test_rounded_to_three_decimals() {
        let score = quality_score("text", 300, 100, &[]);
        assert_eq!(score, (score * 1000.0).round() / 1000.0);
        // ratio 1/3 -> 0.6 + 0.4 * (1 - 0.0333...)
        assert!((score - 0.987).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_for_extremes() {
        for (original, compressed) in [(0, 0), (0, 50), (10, 1000), (1000, 1), (1, 1)] {
            let score = quality_score("", original, compressed, &strings(&["missing"]));
            assert!((0.0..=1.0).contains(&score), "{score} out of range");
        }
    }
}
