//! Rating API gateway client.
//!
//! Thin wrapper over the external REST API. Unauthenticated calls (login,
//! register) go through [`ApiClient`]; everything else goes through an
//! [`AuthorizedClient`], which is built from the session's bearer
//! credential and attaches it to every request.
//!
//! # Endpoints
//!
//! ```text
//! POST /auth/login            - Authenticate
//! POST /auth/register         - Create an account
//! PUT  /auth/update-password  - Change the caller's password
//! GET  /admin/users           - List users (admin)
//! POST /admin/user            - Create a user (admin)
//! GET  /admin/stores          - List stores
//! POST /admin/stores          - Create a store (admin)
//! GET  /admin/ratings         - List every rating (admin)
//! GET  /ratings/store/{id}    - Ratings for one store
//! GET  /ratings/user          - Ratings by the caller
//! POST /ratings               - Create a rating
//! PUT  /ratings/{id}          - Update a rating
//! ```

mod admin;
mod auth;
mod ratings;
mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the rating API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the credential (HTTP 401).
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("credential rejected"))]
    Unauthorized { message: Option<String> },

    /// The API answered with a non-success status.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    /// The request failed or the API was unreachable.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The client could not be constructed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A write was accepted but its result could not be read back. Carries
    /// the message to show the user.
    #[error("Write not confirmed: {0}")]
    Unconfirmed(String),
}

impl ApiError {
    /// Message to show the user: the API's own message if it sent one,
    /// otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthorized {
                message: Some(message),
            }
            | Self::Server {
                message: Some(message),
                ..
            }
            | Self::Unconfirmed(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the API rejected the bearer credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Rating API client.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("store-rating/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base().to_string(),
            }),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Bind a bearer credential, producing a client for authenticated calls.
    #[must_use]
    pub fn authorized(&self, token: SecretString) -> AuthorizedClient {
        AuthorizedClient {
            api: self.clone(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, token).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, path, token)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PUT, path, token)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Handle API response and parse JSON.
    ///
    /// An empty success body decodes as JSON `null`.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            let body = if text.trim().is_empty() { "null" } else { &text };
            return serde_json::from_str(body)
                .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse an error response, extracting the API's `message` if present.
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);

        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Server { status, message }
        }
    }
}

/// Extract a user-facing message from an error body.
///
/// Accepts `{"message": ".."}` or `{"error": ".."}`; anything else has no
/// message.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(ApiMessage::into_text)
}

/// Rating API client bound to a bearer credential.
#[derive(Clone)]
pub struct AuthorizedClient {
    api: ApiClient,
    token: SecretString,
}

impl std::fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("api", &self.api)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AuthorizedClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.api.get(path, Some(&self.token)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.api.post(path, Some(&self.token), body).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.api.put(path, Some(&self.token), body).await
    }
}

/// Encode an ID for use as a URL path segment.
fn path_segment(id: &impl std::fmt::Display) -> String {
    urlencoding::encode(&id.to_string()).into_owned()
}
