//! Submit-or-update of the caller's rating for a store.
//!
//! An account has at most one rating per store. Submitting for a store the
//! account already rated updates that rating in place; otherwise a new one
//! is created. After a successful write the caller's ratings are fetched
//! again so the returned index reflects the write. If that fetch fails the
//! prior index is patched locally instead. A failed write returns the error
//! and produces no new index, so the caller keeps the one it had.
//!
//! A create the API neither echoed nor lets us read back cannot be patched
//! in, since its ID is unknown. That case returns [`ApiError::Unconfirmed`]
//! and the caller re-fetches before its next submission.

use std::future::Future;

use tracing::instrument;

use store_rating_core::{Rating, RatingId, RatingIndex, Stars, StoreId};

use crate::api::{ApiError, AuthorizedClient};

/// Shown when a new rating was saved but could not be read back.
const UNCONFIRMED_MESSAGE: &str =
    "Your rating was saved but could not be reloaded. Refresh before rating this store again.";

/// Rating operations the submit-or-update flow needs.
pub trait RatingsGateway {
    /// Create a rating; returns it if the API echoes it back.
    fn create_rating(
        &self,
        store: &StoreId,
        value: Stars,
    ) -> impl Future<Output = Result<Option<Rating>, ApiError>> + Send;

    /// Update a rating; returns it if the API echoes it back.
    fn update_rating(
        &self,
        id: &RatingId,
        value: Stars,
    ) -> impl Future<Output = Result<Option<Rating>, ApiError>> + Send;

    /// Every rating by the caller.
    fn my_ratings(&self) -> impl Future<Output = Result<Vec<Rating>, ApiError>> + Send;
}

impl RatingsGateway for AuthorizedClient {
    fn create_rating(
        &self,
        store: &StoreId,
        value: Stars,
    ) -> impl Future<Output = Result<Option<Rating>, ApiError>> + Send {
        Self::create_rating(self, store, value)
    }

    fn update_rating(
        &self,
        id: &RatingId,
        value: Stars,
    ) -> impl Future<Output = Result<Option<Rating>, ApiError>> + Send {
        Self::update_rating(self, id, value)
    }

    fn my_ratings(&self) -> impl Future<Output = Result<Vec<Rating>, ApiError>> + Send {
        Self::my_ratings(self)
    }
}

/// Which write a submission turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Created,
    Updated(RatingId),
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub action: SubmitAction,
    /// The caller's rating index after the write.
    pub index: RatingIndex,
    /// `true` if `index` was re-fetched, `false` if it was patched locally.
    pub resynced: bool,
}

/// Submit `value` as the caller's rating for `store`.
///
/// `existing` is the caller's current rating index; it decides between
/// create and update and is the base for a local patch if re-fetching fails.
///
/// # Errors
///
/// Returns the API error if the create or update request fails. Errors
/// from the follow-up fetch are logged and absorbed, except after a create
/// the API did not echo back: then [`ApiError::Unconfirmed`] is returned and
/// the caller must re-fetch its ratings before submitting again.
#[instrument(skip(gateway, existing), fields(store_id = %store, rating = %value))]
pub async fn submit_rating<G>(
    gateway: &G,
    store: &StoreId,
    value: Stars,
    existing: &RatingIndex,
) -> Result<SubmitOutcome, ApiError>
where
    G: RatingsGateway + Sync,
{
    let (action, written) = match existing.get(store) {
        Some(prior) => {
            let echoed = gateway.update_rating(&prior.id, value).await?;
            let written = echoed.unwrap_or_else(|| Rating {
                value,
                ..prior.clone()
            });
            (SubmitAction::Updated(prior.id.clone()), Some(written))
        }
        None => {
            let echoed = gateway.create_rating(store, value).await?;
            (SubmitAction::Created, echoed)
        }
    };

    match gateway.my_ratings().await {
        Ok(ratings) => Ok(SubmitOutcome {
            action,
            index: RatingIndex::from_ratings(ratings),
            resynced: true,
        }),
        Err(e) => {
            let Some(rating) = written else {
                tracing::warn!(error = %e, "Rating created but could not be read back");
                return Err(ApiError::Unconfirmed(UNCONFIRMED_MESSAGE.to_string()));
            };
            tracing::warn!(error = %e, "Re-fetching ratings failed, patching locally");
            let mut index = existing.clone();
            index.upsert(rating);
            Ok(SubmitOutcome {
                action,
                index,
                resynced: false,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

    use super::*;
    use store_rating_core::UserId;

    /// In-memory stand-in for the rating endpoints of one account.
    #[derive(Default)]
    struct FakeGateway {
        ratings: Mutex<Vec<Rating>>,
        next_id: AtomicI64,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
        echo: AtomicBool,
        creates: AtomicI64,
        updates: AtomicI64,
    }

    impl FakeGateway {
        fn echoing() -> Self {
            let fake = Self::default();
            fake.echo.store(true, Ordering::SeqCst);
            fake
        }

        fn stored(&self) -> Vec<Rating> {
            self.ratings.lock().unwrap().clone()
        }
    }

    impl RatingsGateway for FakeGateway {
        async fn create_rating(
            &self,
            store: &StoreId,
            value: Stars,
        ) -> Result<Option<Rating>, ApiError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ApiError::Server {
                    status: 500,
                    message: Some("boom".to_string()),
                });
            }
            self.creates.fetch_add(1, Ordering::SeqCst);
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let rating = Rating {
                id: RatingId::from(id),
                user_id: Some(UserId::from(1)),
                store_id: store.clone(),
                value,
                comment: None,
                user: None,
            };
            self.ratings.lock().unwrap().push(rating.clone());
            Ok(self.echo.load(Ordering::SeqCst).then_some(rating))
        }

        async fn update_rating(
            &self,
            id: &RatingId,
            value: Stars,
        ) -> Result<Option<Rating>, ApiError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ApiError::Server {
                    status: 404,
                    message: Some("Rating not found".to_string()),
                });
            }
            self.updates.fetch_add(1, Ordering::SeqCst);
            let mut ratings = self.ratings.lock().unwrap();
            let rating = ratings.iter_mut().find(|r| &r.id == id).unwrap();
            rating.value = value;
            Ok(self.echo.load(Ordering::SeqCst).then(|| rating.clone()))
        }

        async fn my_ratings(&self) -> Result<Vec<Rating>, ApiError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(ApiError::Decode("unexpected body".to_string()));
            }
            Ok(self.stored())
        }
    }

    fn stars(n: i64) -> Stars {
        Stars::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_update_same_entity() {
        let gateway = FakeGateway::default();
        let store = StoreId::from(10);

        let first = submit_rating(&gateway, &store, stars(3), &RatingIndex::default())
            .await
            .unwrap();
        assert_eq!(first.action, SubmitAction::Created);
        assert!(first.resynced);
        let created = first.index.get(&store).unwrap().clone();
        assert_eq!(created.value.get(), 3);

        let second = submit_rating(&gateway, &store, stars(5), &first.index)
            .await
            .unwrap();
        assert_eq!(second.action, SubmitAction::Updated(created.id.clone()));
        let updated = second.index.get(&store).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.value.get(), 5);

        assert_eq!(gateway.stored().len(), 1);
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_write_changes_nothing() {
        let gateway = FakeGateway::default();
        let store = StoreId::from(10);
        let seeded = submit_rating(&gateway, &store, stars(2), &RatingIndex::default())
            .await
            .unwrap()
            .index;
        let before = seeded.clone();

        gateway.fail_writes.store(true, Ordering::SeqCst);
        let err = submit_rating(&gateway, &store, stars(4), &seeded)
            .await
            .unwrap_err();
        assert_eq!(err.user_message("Error submitting rating."), "Rating not found");
        assert_eq!(seeded, before);
        assert_eq!(gateway.stored()[0].value.get(), 2);

        let other = StoreId::from(11);
        assert!(
            submit_rating(&gateway, &other, stars(4), &seeded)
                .await
                .is_err()
        );
        assert_eq!(gateway.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_refetch_failure_patches_locally() {
        let gateway = FakeGateway::echoing();
        gateway.fail_reads.store(true, Ordering::SeqCst);
        let store = StoreId::from(7);

        let outcome = submit_rating(&gateway, &store, stars(4), &RatingIndex::default())
            .await
            .unwrap();
        assert!(!outcome.resynced);
        assert_eq!(outcome.index.get(&store).unwrap().value.get(), 4);

        let again = submit_rating(&gateway, &store, stars(1), &outcome.index)
            .await
            .unwrap();
        assert!(matches!(again.action, SubmitAction::Updated(_)));
        assert_eq!(again.index.len(), 1);
        assert_eq!(again.index.get(&store).unwrap().value.get(), 1);
    }

    #[tokio::test]
    async fn test_update_without_echo_patches_from_prior() {
        let gateway = FakeGateway::default();
        let store = StoreId::from(3);
        let seeded = submit_rating(&gateway, &store, stars(2), &RatingIndex::default())
            .await
            .unwrap()
            .index;

        gateway.fail_reads.store(true, Ordering::SeqCst);
        let outcome = submit_rating(&gateway, &store, stars(5), &seeded)
            .await
            .unwrap();
        assert!(!outcome.resynced);
        let patched = outcome.index.get(&store).unwrap();
        assert_eq!(patched.id, seeded.get(&store).unwrap().id);
        assert_eq!(patched.value.get(), 5);
    }

    #[tokio::test]
    async fn test_unconfirmed_create_never_duplicates() {
        let gateway = FakeGateway::default();
        gateway.fail_reads.store(true, Ordering::SeqCst);
        let store = StoreId::from(3);
        let empty = RatingIndex::default();

        let err = submit_rating(&gateway, &store, stars(2), &empty)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unconfirmed(_)));
        assert!(!err.is_unauthorized());
        assert!(err.user_message("Error submitting rating.").contains("Refresh"));
        assert_eq!(gateway.stored().len(), 1);

        // Once reads recover, the caller's re-fetched index routes to an update.
        gateway.fail_reads.store(false, Ordering::SeqCst);
        let index = RatingIndex::from_ratings(gateway.my_ratings().await.unwrap());
        let second = submit_rating(&gateway, &store, stars(5), &index)
            .await
            .unwrap();
        assert!(matches!(second.action, SubmitAction::Updated(_)));

        let for_store: Vec<Rating> = gateway
            .stored()
            .into_iter()
            .filter(|r| r.store_id == store)
            .collect();
        assert_eq!(for_store.len(), 1);
        assert_eq!(for_store.first().unwrap().value.get(), 5);
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 1);
    }
}
