//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use store_rating_core::RegistrationForm;

use super::{ApiClient, ApiError, ApiMessage, AuthorizedClient, LoginRequest, LoginResponse, PasswordChange};

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// The response is returned as-is; checking that a token is present is
    /// the session lifecycle's job.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        self.post("/auth/login", None, &body).await
    }

    /// Create an account.
    ///
    /// Callers validate `form` first; this issues the request unconditionally.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API refuses the account.
    #[instrument(skip(self, form), fields(email = %form.email, role = %form.role))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post("/auth/register", None, form).await?;
        Ok(())
    }
}

impl AuthorizedClient {
    /// Change the caller's password.
    ///
    /// Returns the API's confirmation message, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the old password is wrong.
    #[instrument(skip_all)]
    pub async fn update_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<Option<String>, ApiError> {
        let body = PasswordChange {
            old_password: old_password.expose_secret(),
            new_password: new_password.expose_secret(),
        };
        let reply: Option<ApiMessage> = self.put("/auth/update-password", &body).await?;
        Ok(reply.and_then(ApiMessage::into_text))
    }
}
