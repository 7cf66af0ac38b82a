//! Command implementations.
//!
//! Every command that talks to the API goes through [`Context`], which
//! loads the stored session, checks it belongs on the right dashboard and
//! turns a 401 from the API into a cleared session.

pub mod admin;
pub mod auth;
pub mod owner;
pub mod user;

use thiserror::Error;

use store_rating_core::{Dashboard, Role, ValidationError};
use store_rating_web::api::{ApiClient, ApiError};
use store_rating_web::config::ConfigError;
use store_rating_web::session::{
    AuthError, CredentialStoreError, CurrentSession, SESSION_EXPIRED_MESSAGE, SessionLifecycle,
};

use crate::credentials::FileCredentialStore;

/// Errors reported by `srate` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// No session is stored.
    #[error("Not signed in. Run `srate login` first.")]
    NotSignedIn,

    /// The stored session routes to a different dashboard.
    #[error("This command is for the {} ({}); you are signed in as {}.", .expected.title(), .expected, .actual.label())]
    WrongDashboard { expected: Dashboard, actual: Role },

    /// The API rejected the stored credential; it has been cleared.
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// An API call failed; carries the message to show.
    #[error("{0}")]
    Rejected(String),

    /// Input failed the checks run before any request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Input could not be understood.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Credentials(#[from] CredentialStoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Shared state for one `srate` invocation.
#[derive(Debug)]
pub struct Context {
    lifecycle: SessionLifecycle<FileCredentialStore>,
}

impl Context {
    #[must_use]
    pub const fn new(api: ApiClient, store: FileCredentialStore) -> Self {
        Self {
            lifecycle: SessionLifecycle::new(api, store),
        }
    }

    /// The session lifecycle backing this invocation.
    #[must_use]
    pub const fn lifecycle(&self) -> &SessionLifecycle<FileCredentialStore> {
        &self.lifecycle
    }

    /// The stored session.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotSignedIn`] if there is none.
    pub async fn session(&self) -> Result<CurrentSession, CliError> {
        self.lifecycle
            .current()
            .await?
            .ok_or(CliError::NotSignedIn)
    }

    /// The stored session, if it lands on `dashboard`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotSignedIn`] without a session and
    /// [`CliError::WrongDashboard`] for a session of another role.
    pub async fn session_for(&self, dashboard: Dashboard) -> Result<CurrentSession, CliError> {
        let session = self.session().await?;
        if session.dashboard() == dashboard {
            Ok(session)
        } else {
            Err(CliError::WrongDashboard {
                expected: dashboard,
                actual: session.role,
            })
        }
    }

    /// Turn an API result into a command result.
    ///
    /// A 401 clears the stored session. Other failures carry the API's
    /// message, or `fallback` if it sent none.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::SessionExpired`] or [`CliError::Rejected`].
    pub async fn settle<T>(&self, result: Result<T, ApiError>, fallback: &str) -> Result<T, CliError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_unauthorized() => {
                self.lifecycle.expire().await?;
                Err(CliError::SessionExpired)
            }
            Err(e) => {
                tracing::debug!(error = %e, "API call failed");
                Err(CliError::Rejected(e.user_message(fallback)))
            }
        }
    }
}
