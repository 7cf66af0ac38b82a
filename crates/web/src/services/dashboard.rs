//! Display rows for the dashboards.
//!
//! Pure functions from fetched lists to what each dashboard renders. They
//! run on every request against freshly fetched data.

use store_rating_core::{
    AverageRating, FilterSet, Rating, RatingIndex, Stars, Store, StoreAggregate, User, UserId,
    aggregate_all,
};

/// A store with its rating aggregate (admin store table).
#[derive(Debug, Clone)]
pub struct StoreRow {
    pub store: Store,
    pub average: AverageRating,
    /// Number of ratings, if the rating list was available.
    pub count: Option<usize>,
}

/// Pair every store with its aggregate.
///
/// With the full rating list available the aggregate is computed from it;
/// otherwise the API-reported average is shown and the count is unknown.
#[must_use]
pub fn store_rows(stores: Vec<Store>, ratings: Option<&[Rating]>) -> Vec<StoreRow> {
    match ratings {
        Some(ratings) => {
            let aggregates = aggregate_all(ratings);
            stores
                .into_iter()
                .map(|store| {
                    let agg = aggregates
                        .get(&store.id)
                        .cloned()
                        .unwrap_or_else(|| StoreAggregate::unrated(store.id.clone()));
                    StoreRow {
                        store,
                        average: agg.average,
                        count: Some(agg.count),
                    }
                })
                .collect()
        }
        None => stores
            .into_iter()
            .map(|store| StoreRow {
                average: AverageRating::from_reported(store.average_rating),
                count: None,
                store,
            })
            .collect(),
    }
}

/// A store as shown to a regular user.
#[derive(Debug, Clone)]
pub struct RateableStore {
    pub store: Store,
    /// Overall rating as reported by the API.
    pub overall: AverageRating,
    /// The caller's own rating, if any.
    pub mine: Option<Stars>,
}

/// Stores matching `filters`, each with the caller's rating from `index`.
#[must_use]
pub fn rateable_stores(
    stores: &[Store],
    index: &RatingIndex,
    filters: &FilterSet,
) -> Vec<RateableStore> {
    filters
        .apply(stores)
        .into_iter()
        .map(|store| RateableStore {
            overall: AverageRating::from_reported(store.average_rating),
            mine: index.get(&store.id).map(|r| r.value),
            store: store.clone(),
        })
        .collect()
}

/// Pick the store a store owner's dashboard shows.
///
/// The API may return just the owner's store; if it returns several, the
/// one whose owner matches `owner` is chosen. A lone store is taken as-is
/// unless both sides name an owner and they differ.
#[must_use]
pub fn owner_store(stores: Vec<Store>, owner: Option<&UserId>) -> Option<Store> {
    if stores.len() == 1 {
        return stores.into_iter().next().filter(|s| match (&s.owner_id, owner) {
            (Some(store_owner), Some(owner)) => store_owner == owner,
            _ => true,
        });
    }
    let owner = owner?;
    stores
        .into_iter()
        .find(|s| s.owner_id.as_ref() == Some(owner))
}

/// Users offered as owners on the "add store" form.
#[must_use]
pub fn owner_candidates(users: &[User]) -> Vec<&User> {
    users
        .iter()
        .filter(|u| u.role == store_rating_core::Role::StoreOwner)
        .collect()
}
