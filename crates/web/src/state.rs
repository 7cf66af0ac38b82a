//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::api::{ApiClient, ApiError};
use crate::config::WebConfig;
use crate::session::{BrowserCredentialStore, SessionLifecycle};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the rating API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the rating API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Session lifecycle bound to one browser session.
    #[must_use]
    pub fn lifecycle(&self, session: Session) -> SessionLifecycle<BrowserCredentialStore> {
        SessionLifecycle::new(self.api().clone(), BrowserCredentialStore::new(session))
    }
}
