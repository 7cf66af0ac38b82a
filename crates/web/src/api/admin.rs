//! User and store management endpoints.

use tracing::instrument;

use store_rating_core::{Rating, RegistrationForm, Store, StoreForm, User};

use super::{ApiError, AuthorizedClient, OneOrMany, StoreCreated, UserCreated};

impl AuthorizedClient {
    /// List every user (admin only).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/admin/users").await
    }

    /// Create a user (admin only).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API refuses the user.
    #[instrument(skip(self, form), fields(email = %form.email, role = %form.role))]
    pub async fn create_user(&self, form: &RegistrationForm) -> Result<Option<User>, ApiError> {
        let created: UserCreated = self.post("/admin/user", form).await?;
        Ok(created.into_user())
    }

    /// List stores.
    ///
    /// For a store owner the API may answer with the owner's single store
    /// rather than an array; both are returned as a list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn stores(&self) -> Result<Vec<Store>, ApiError> {
        let stores: OneOrMany<Store> = self.get("/admin/stores").await?;
        Ok(stores.into_vec())
    }

    /// Create a store (admin only).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API refuses the store.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_store(&self, form: &StoreForm) -> Result<Option<Store>, ApiError> {
        let created: StoreCreated = self.post("/admin/stores", form).await?;
        Ok(created.into_store())
    }

    /// List every rating (admin only).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn all_ratings(&self) -> Result<Vec<Rating>, ApiError> {
        self.get("/admin/ratings").await
    }
}
