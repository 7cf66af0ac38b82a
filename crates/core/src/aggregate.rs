//! Rating aggregation.
//!
//! Derived values over rating lists: per-store averages and the per-user
//! "my rating for store X" index. Everything here is a pure function of its
//! input snapshot; callers recompute after every mutation that touches the
//! underlying list.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::Rating;
use crate::types::StoreId;

/// Average rating of a store.
///
/// `Unrated` is distinct from any score: with ratings constrained to 1..=5
/// an average can never be zero, and a store with no ratings has no average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AverageRating {
    #[default]
    Unrated,
    /// Arithmetic mean rounded to one decimal place.
    Rated(Decimal),
}

impl AverageRating {
    /// Mean of `sum / count`, rounded half away from zero to one decimal.
    #[must_use]
    pub fn from_sum(sum: u64, count: usize) -> Self {
        if count == 0 {
            return Self::Unrated;
        }
        let mean = Decimal::from(sum) / Decimal::from(count);
        Self::Rated(mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Interpret an average reported by the API.
    ///
    /// Missing and zero averages mean the store has not been rated.
    #[must_use]
    pub fn from_reported(reported: Option<Decimal>) -> Self {
        match reported {
            Some(avg) if !avg.is_zero() => {
                Self::Rated(avg.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
            }
            _ => Self::Unrated,
        }
    }

    /// The rounded average, if rated.
    #[must_use]
    pub const fn value(self) -> Option<Decimal> {
        match self {
            Self::Unrated => None,
            Self::Rated(avg) => Some(avg),
        }
    }

    /// Whether at least one rating contributed.
    #[must_use]
    pub const fn is_rated(self) -> bool {
        matches!(self, Self::Rated(_))
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrated => f.write_str("No Ratings"),
            Self::Rated(avg) => write!(f, "{avg:.1}"),
        }
    }
}

/// Aggregate of all ratings for one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreAggregate {
    pub store_id: StoreId,
    pub average: AverageRating,
    pub count: usize,
}

impl StoreAggregate {
    /// Aggregate for a store with no ratings.
    #[must_use]
    pub const fn unrated(store_id: StoreId) -> Self {
        Self {
            store_id,
            average: AverageRating::Unrated,
            count: 0,
        }
    }
}

/// Aggregate the ratings of `store` found in `ratings`.
///
/// Ratings for other stores are ignored. An empty match yields
/// [`AverageRating::Unrated`] with a count of zero.
#[must_use]
pub fn aggregate(ratings: &[Rating], store: &StoreId) -> StoreAggregate {
    let (sum, count) = ratings
        .iter()
        .filter(|r| &r.store_id == store)
        .fold((0_u64, 0_usize), |(sum, count), r| {
            (sum + u64::from(r.value.get()), count + 1)
        });

    StoreAggregate {
        store_id: store.clone(),
        average: AverageRating::from_sum(sum, count),
        count,
    }
}

/// Aggregate every store that appears in `ratings`, in one pass.
///
/// Stores with no ratings are absent from the map; use
/// [`StoreAggregate::unrated`] for them.
#[must_use]
pub fn aggregate_all(ratings: &[Rating]) -> HashMap<StoreId, StoreAggregate> {
    let mut totals: HashMap<&StoreId, (u64, usize)> = HashMap::new();
    for rating in ratings {
        let entry = totals.entry(&rating.store_id).or_default();
        entry.0 += u64::from(rating.value.get());
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(store_id, (sum, count))| {
            (
                store_id.clone(),
                StoreAggregate {
                    store_id: store_id.clone(),
                    average: AverageRating::from_sum(sum, count),
                    count,
                },
            )
        })
        .collect()
}

/// Lookup from store to the current account's rating of it.
///
/// Built by folding a rating list keyed by store. If the list holds more
/// than one rating for a store, the one later in iteration order wins. The
/// API never returns such duplicates for a single account; the rule makes
/// the result well defined if it ever does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingIndex {
    by_store: HashMap<StoreId, Rating>,
}

impl RatingIndex {
    /// Index `ratings` by store.
    #[must_use]
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let by_store = ratings
            .into_iter()
            .map(|r| (r.store_id.clone(), r))
            .collect();
        Self { by_store }
    }

    /// The rating for `store`, if any.
    #[must_use]
    pub fn get(&self, store: &StoreId) -> Option<&Rating> {
        self.by_store.get(store)
    }

    /// Insert or replace the rating for its store.
    pub fn upsert(&mut self, rating: Rating) {
        self.by_store.insert(rating.store_id.clone(), rating);
    }

    /// Number of rated stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_store.len()
    }

    /// Whether no store has been rated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_store.is_empty()
    }

    /// Iterate over the indexed ratings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Rating> {
        self.by_store.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{RatingId, Stars};

    fn rating(id: i64, store: i64, value: i64) -> Rating {
        Rating {
            id: RatingId::from(id),
            user_id: None,
            store_id: StoreId::from(store),
            value: Stars::new(value).unwrap(),
            comment: None,
            user: None,
        }
    }

    #[test]
    fn test_aggregate_empty_is_unrated() {
        let agg = aggregate(&[], &StoreId::from(1));
        assert_eq!(agg.average, AverageRating::Unrated);
        assert_eq!(agg.count, 0);
    }

    #[test]
    fn test_aggregate_filters_by_store() {
        let ratings = [rating(1, 1, 4), rating(2, 1, 5), rating(3, 2, 1)];
        let agg = aggregate(&ratings, &StoreId::from(1));
        assert_eq!(agg.average, AverageRating::Rated(Decimal::new(45, 1)));
        assert_eq!(agg.count, 2);

        let other = aggregate(&ratings, &StoreId::from(2));
        assert_eq!(other.average.value(), Some(Decimal::ONE));
        assert_eq!(other.count, 1);
    }

    #[test]
    fn test_aggregate_no_match_is_unrated() {
        let ratings = [rating(1, 1, 4)];
        let agg = aggregate(&ratings, &StoreId::from(99));
        assert!(!agg.average.is_rated());
        assert_eq!(agg.count, 0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        // 4 + 4 + 5 = 13 / 3 = 4.333...
        assert_eq!(
            AverageRating::from_sum(13, 3),
            AverageRating::Rated(Decimal::new(43, 1))
        );
        // 1 + 2 + 2 + 2 + 2 + 2 + 2 + 2 = 15 / 8 = 1.875
        assert_eq!(
            AverageRating::from_sum(15, 8),
            AverageRating::Rated(Decimal::new(19, 1))
        );
        // 9 / 4 = 2.25 rounds half away from zero
        assert_eq!(
            AverageRating::from_sum(9, 4),
            AverageRating::Rated(Decimal::new(23, 1))
        );
    }

    #[test]
    fn test_average_display() {
        assert_eq!(AverageRating::Unrated.to_string(), "No Ratings");
        assert_eq!(AverageRating::from_sum(8, 2).to_string(), "4.0");
        assert_eq!(AverageRating::from_sum(9, 2).to_string(), "4.5");
    }

    #[test]
    fn test_from_reported() {
        assert_eq!(AverageRating::from_reported(None), AverageRating::Unrated);
        assert_eq!(
            AverageRating::from_reported(Some(Decimal::ZERO)),
            AverageRating::Unrated
        );
        assert_eq!(
            AverageRating::from_reported(Some(Decimal::new(4333, 3))).to_string(),
            "4.3"
        );
    }

    #[test]
    fn test_aggregate_all_matches_aggregate() {
        let ratings = [rating(1, 1, 4), rating(2, 1, 5), rating(3, 2, 1)];
        let all = aggregate_all(&ratings);
        assert_eq!(all.len(), 2);
        for store in [StoreId::from(1), StoreId::from(2)] {
            assert_eq!(all.get(&store), Some(&aggregate(&ratings, &store)));
        }
    }

    #[test]
    fn test_index_by_store() {
        let index = RatingIndex::from_ratings([rating(1, 1, 4), rating(2, 2, 3)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&StoreId::from(2)).unwrap().id, RatingId::from(2));
        assert!(index.get(&StoreId::from(3)).is_none());
    }

    #[test]
    fn test_index_later_duplicate_wins() {
        let index = RatingIndex::from_ratings([rating(1, 1, 2), rating(7, 1, 5)]);
        assert_eq!(index.len(), 1);
        let kept = index.get(&StoreId::from(1)).unwrap();
        assert_eq!(kept.id, RatingId::from(7));
        assert_eq!(kept.value.get(), 5);
    }

    #[test]
    fn test_index_is_pure() {
        let input = vec![rating(1, 1, 4), rating(2, 2, 3), rating(3, 1, 1)];
        assert_eq!(
            RatingIndex::from_ratings(input.clone()),
            RatingIndex::from_ratings(input)
        );
    }

    #[test]
    fn test_upsert_replaces_same_store() {
        let mut index = RatingIndex::from_ratings([rating(1, 1, 2)]);
        index.upsert(rating(1, 1, 5));
        index.upsert(rating(4, 2, 3));
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&StoreId::from(1)).unwrap().value.get(), 5);
    }
}
