use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct RateBandModel {
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BandRatingDto {
    pub average: f64,
    pub count: i64,
}

/// Recomputes a band's rating average after one profile rates it, without
/// re-querying every row. `old_score = None` is a first rating (count grows
/// by one); `Some` replaces that profile's previous score (count unchanged).
pub fn recompute_average(
    average: f64,
    count: i64,
    old_score: Option<i32>,
    new_score: i32,
) -> (f64, i64) {
    match old_score {
        None => {
            let new_count = count + 1;
            let new_average = (average * count as f64 + f64::from(new_score)) / new_count as f64;
            (new_average, new_count)
        }
        Some(_) if count <= 0 => (f64::from(new_score), 1),
        Some(old) => {
            let new_average = average + f64::from(new_score - old) / count as f64;
            (new_average, count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rating_becomes_the_average() {
        let (average, count) = recompute_average(0.0, 0, None, 4);
        assert_eq!(average, 4.0);
        assert_eq!(count, 1);
    }

    #[test]
    fn additional_rating_shifts_the_average() {
        // one existing 5, new profile rates 3 -> (5 + 3) / 2
        let (average, count) = recompute_average(5.0, 1, None, 3);
        assert_eq!(average, 4.0);
        assert_eq!(count, 2);
    }

    #[test]
    fn updated_rating_keeps_the_count() {
        // scores 5 and 3, the 3 becomes a 5
        let (average, count) = recompute_average(4.0, 2, Some(3), 5);
        assert_eq!(average, 5.0);
        assert_eq!(count, 2);
    }

    #[test]
    fn unchanged_score_is_a_noop() {
        let (average, count) = recompute_average(3.5, 4, Some(2), 2);
        assert_eq!(average, 3.5);
        assert_eq!(count, 4);
    }

    #[test]
    fn stale_update_against_empty_aggregate_recovers() {
        let (average, count) = recompute_average(0.0, 0, Some(4), 5);
        assert_eq!(average, 5.0);
        assert_eq!(count, 1);
    }
}
