//! Title rating.

/// Mean review score from aggregated totals.
///
/// Returns `None` when there are no reviews; a title without reviews has no
/// rating rather than a rating of zero.
pub fn mean_score(score_sum: i64, review_count: i64) -> Option<f64> {
    if review_count <= 0 {
        return None;
    }
    Some(score_sum as f64 / review_count as f64)
}
