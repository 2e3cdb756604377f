use super::engine::ScoredListing;

/// Order results best first and apply the optional limit.
///
/// The sort is stable, so equal scores keep their input order. A limit of
/// zero is treated the same as no limit.
pub fn rank(mut results: Vec<ScoredListing>, limit: Option<usize>) -> Vec<ScoredListing> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(limit) = limit.filter(|&n| n > 0) {
        results.truncate(limit);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Listing;
    use crate::scoring::engine::ScoreBreakdown;

    fn scored(id: &str, score: f64) -> ScoredListing {
        ScoredListing {
            listing: Listing::new(id),
            score,
            breakdown: ScoreBreakdown::default(),
        }
    }

    fn ids(results: &[ScoredListing]) -> Vec<&str> {
        results.iter().map(|r| r.listing.id.as_str()).collect()
    }

    #[test]
    fn test_sorts_descending() {
        let ranked = rank(vec![scored("a", 10.0), scored("b", 90.0), scored("c", 50.0)], None);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(
            vec![scored("first", 50.0), scored("top", 70.0), scored("second", 50.0)],
            None,
        );
        assert_eq!(ids(&ranked), vec!["top", "first", "second"]);
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let ranked = rank(
            vec![scored("a", 1.0), scored("b", 3.0), scored("c", 2.0)],
            Some(2),
        );
        assert_eq!(ids(&ranked), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let ranked = rank(vec![scored("a", 1.0), scored("b", 2.0)], Some(0));
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_limit_larger_than_input() {
        let ranked = rank(vec![scored("a", 1.0)], Some(10));
        assert_eq!(ranked.len(), 1);
    }
}
