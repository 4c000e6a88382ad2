//! Fuzzy name similarity

use similar::TextDiff;

use crate::types::SIMILARITY_CUTOFF;

/// Similarity of two names in `[0, 1]`
///
/// Ratio of matching characters, `2 * M / (len(a) + len(b))`, where `M` is
/// the longest common subsequence of the lowercased names as found by a
/// Myers character diff. This is never below the matching-blocks ratio, and
/// exceeds it when matches cross. Two empty names score `1.0`.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    TextDiff::from_chars(a.as_str(), b.as_str()).ratio()
}

/// Returns the score of `candidate` if it clears [`SIMILARITY_CUTOFF`]
#[must_use]
pub fn close_match(keyword: &str, candidate: &str) -> Option<f32> {
    let score = similarity(keyword, candidate);
    (score >= SIMILARITY_CUTOFF).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        assert!((similarity("project", "project") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_one_deletion() {
        // 2 * 6 / 13
        let score = similarity("project", "projet");
        assert!((score - 12.0 / 13.0).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn test_disjoint() {
        assert!(similarity("zzz", "a").abs() < f32::EPSILON);
    }

    #[test]
    fn test_case_folded() {
        assert!((similarity("README", "readme") - 1.0).abs() < f32::EPSILON);
        assert!(close_match("readme", "README.md").is_some());
    }

    #[test]
    fn test_symmetric_range() {
        for (a, b) in [("read_me.txt", "readme"), ("other.txt", "readme"), ("", "x")] {
            let ab = similarity(a, b);
            assert!((0.0..=1.0).contains(&ab));
            assert!((ab - similarity(b, a)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cutoff() {
        assert!(close_match("readme", "read_me.txt").is_some());
        assert!(close_match("readme", "other.txt").is_none());
        assert!(close_match("project", "unrelated").is_none());
    }

    #[test]
    fn test_crossing_matches_count() {
        // Longest common subsequence is "bcba": 2 * 4 / 13. Greedy longest
        // blocks would stop at 3 matches and score 6 / 13, below the cutoff.
        let score = similarity("abcbdab", "bdcaba");
        assert!((score - 8.0 / 13.0).abs() < 1e-6, "got {score}");
        assert!(close_match("abcbdab", "bdcaba").is_some());
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        // 2 * 3 / (4 + 6) == 0.6 exactly
        let score = close_match("abcd", "abcxyz").unwrap();
        assert!((score - SIMILARITY_CUTOFF).abs() < f32::EPSILON);
    }
}
