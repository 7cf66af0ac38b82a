//! Rating endpoints.

use tracing::instrument;

use store_rating_core::{Rating, RatingId, Stars, StoreId};

use super::{ApiError, AuthorizedClient, NewRating, RatingChange, RatingWritten, path_segment};

impl AuthorizedClient {
    /// Ratings submitted for one store.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(store_id = %store))]
    pub async fn store_ratings(&self, store: &StoreId) -> Result<Vec<Rating>, ApiError> {
        self.get(&format!("/ratings/store/{}", path_segment(store)))
            .await
    }

    /// Ratings submitted by the caller.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn my_ratings(&self) -> Result<Vec<Rating>, ApiError> {
        self.get("/ratings/user").await
    }

    /// Rate a store the caller has not rated yet.
    ///
    /// Returns the created rating if the API echoes it back.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API refuses the rating.
    #[instrument(skip(self), fields(store_id = %store, rating = %value))]
    pub async fn create_rating(
        &self,
        store: &StoreId,
        value: Stars,
    ) -> Result<Option<Rating>, ApiError> {
        let body = NewRating {
            store_id: store,
            rating: value,
        };
        let written: RatingWritten = self.post("/ratings", &body).await?;
        Ok(written.into_rating())
    }

    /// Change the value of an existing rating.
    ///
    /// Returns the updated rating if the API echoes it back.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the rating does not belong to
    /// the caller.
    #[instrument(skip(self), fields(rating_id = %id, rating = %value))]
    pub async fn update_rating(
        &self,
        id: &RatingId,
        value: Stars,
    ) -> Result<Option<Rating>, ApiError> {
        let body = RatingChange { rating: value };
        let written: RatingWritten = self
            .put(&format!("/ratings/{}", path_segment(id)), &body)
            .await?;
        Ok(written.into_rating())
    }
}
