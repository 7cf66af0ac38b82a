//! Session lifecycle.
//!
//! A session is created by a successful login, read by every authenticated
//! request and destroyed by logout or by the API rejecting the credential.
//! Where it is persisted is abstracted behind [`CredentialStore`]: the web
//! client keeps it in the browser session, the CLI in a file.

mod store;

pub use store::{BrowserCredentialStore, keys};

use std::future::Future;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use store_rating_core::{Dashboard, Role, UserId, route_for_role};

use crate::api::{ApiClient, ApiError, AuthorizedClient};

/// Shown when login succeeds but the API sends no token.
pub const MISSING_TOKEN_MESSAGE: &str = "Token not received. Please try again.";

/// Shown when login fails without a message from the API.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Something went wrong. Please check your credentials.";

/// Shown on the login page after the API rejected a stored credential.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// The signed-in account and its bearer credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentSession {
    token: String,
    /// Account ID, if the API reported one at login.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub signed_in_at: DateTime<Utc>,
}

impl std::fmt::Debug for CurrentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentSession")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("signed_in_at", &self.signed_in_at)
            .finish()
    }
}

impl CurrentSession {
    /// Create a session for a freshly issued token.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        user_id: Option<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            token: token.into(),
            user_id,
            name: name.into(),
            email: email.into(),
            role,
            signed_in_at: Utc::now(),
        }
    }

    /// The bearer credential.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }

    /// Dashboard this session lands on.
    #[must_use]
    pub const fn dashboard(&self) -> Dashboard {
        route_for_role(self.role)
    }

    /// A gateway client carrying this session's credential.
    #[must_use]
    pub fn client(&self, api: &ApiClient) -> AuthorizedClient {
        api.authorized(self.token())
    }
}

/// Errors from persisting or loading a session.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Persistent storage for the current session under one well-known key.
pub trait CredentialStore {
    /// The stored session, if any.
    fn load(&self)
    -> impl Future<Output = Result<Option<CurrentSession>, CredentialStoreError>> + Send;

    /// Replace the stored session.
    fn save(
        &self,
        session: &CurrentSession,
    ) -> impl Future<Output = Result<(), CredentialStoreError>> + Send;

    /// Remove the stored session. Clearing an empty store succeeds.
    fn clear(&self) -> impl Future<Output = Result<(), CredentialStoreError>> + Send;
}

/// Errors from the session lifecycle.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login succeeded but the API sent no token.
    #[error("Token not received. Please try again.")]
    MissingToken,

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be stored or read.
    #[error(transparent)]
    Store(#[from] CredentialStoreError),
}

impl AuthError {
    /// Message to show on the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingToken => MISSING_TOKEN_MESSAGE.to_string(),
            Self::Api(e) => e.user_message(LOGIN_FALLBACK_MESSAGE),
            Self::Store(_) => LOGIN_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Login, logout and lookup of the current session.
///
/// The lifecycle is the only component that writes the credential; views
/// read it and trigger transitions through here.
#[derive(Debug, Clone)]
pub struct SessionLifecycle<S> {
    api: ApiClient,
    store: S,
}

impl<S: CredentialStore + Sync> SessionLifecycle<S> {
    #[must_use]
    pub const fn new(api: ApiClient, store: S) -> Self {
        Self { api, store }
    }

    /// Authenticate and persist the resulting session.
    ///
    /// Any previously stored session is replaced only on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] if the API answers without a
    /// token, [`AuthError::Api`] if it rejects the credentials or cannot be
    /// reached, and [`AuthError::Store`] if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<CurrentSession, AuthError> {
        let response = self.api.login(email, password).await?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let user = response.user.unwrap_or_default();

        let email = if user.email.is_empty() {
            email.to_string()
        } else {
            user.email
        };
        let session = CurrentSession::new(token, user.id, user.name, email, user.role);
        self.store.save(&session).await?;

        tracing::info!(role = %session.role, dashboard = %session.dashboard(), "Signed in");
        Ok(session)
    }

    /// Forget the stored session.
    ///
    /// Purely local: no server-side invalidation is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the store cannot be cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.clear().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// The stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the store cannot be read.
    pub async fn current(&self) -> Result<Option<CurrentSession>, AuthError> {
        Ok(self.store.load().await?)
    }

    /// Drop a session whose credential the API rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the store cannot be cleared.
    #[instrument(skip(self))]
    pub async fn expire(&self) -> Result<(), AuthError> {
        self.store.clear().await?;
        tracing::warn!("Credential rejected by API, session cleared");
        Ok(())
    }

    /// The gateway client this lifecycle authenticates against.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The underlying credential store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
