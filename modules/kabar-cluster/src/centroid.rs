//! Running weighted mean for issue centroids.

/// Fold a new member's embedding into an issue centroid:
/// `(centroid * count + vector) / (count + 1)`.
///
/// Exact only while `news_count` matches the number of prior contributions;
/// the update is not reversible. Counts below 1 are clamped.
pub fn advance(centroid: &[f32], news_count: i32, vector: &[f32]) -> Vec<f32> {
    let count = news_count.max(1) as f32;
    centroid
        .iter()
        .zip(vector.iter())
        .map(|(c, v)| (c * count + v) / (count + 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-5, "{a} != {e}");
        }
    }

    #[test]
    fn fresh_issue_joining_its_own_centroid_is_unchanged() {
        let v = [0.5, -0.25, 1.0];
        assert_close(&advance(&v, 1, &v), &v);
    }

    #[test]
    fn second_member_averages_evenly() {
        let updated = advance(&[1.0, 0.0], 1, &[0.0, 1.0]);
        assert_close(&updated, &[0.5, 0.5]);
    }

    #[test]
    fn later_members_are_weighted_down() {
        // Three prior members at (1, 0); the fourth pulls by a quarter.
        let updated = advance(&[1.0, 0.0], 3, &[0.0, 1.0]);
        assert_close(&updated, &[0.75, 0.25]);
    }

    #[test]
    fn large_count_pins_the_centroid() {
        let centroid = [0.3, 0.7];
        let updated = advance(&centroid, 1_000_000, &centroid);
        assert_close(&updated, &centroid);
    }

    #[test]
    fn count_below_one_clamps() {
        let updated = advance(&[1.0, 0.0], 0, &[0.0, 1.0]);
        assert_close(&updated, &[0.5, 0.5]);
    }
}
