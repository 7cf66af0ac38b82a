//! Unified error handling for the web client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::session::{AuthError, CredentialStoreError};

/// Application-level error type for route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rating API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session lifecycle operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Browser session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] CredentialStoreError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(e) | Self::Auth(AuthError::Api(e)) => !e.is_unauthorized(),
            Self::Auth(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::BadRequest(_) => false,
        }
    }

    const fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(e) | Self::Auth(AuthError::Api(e)) => e.is_unauthorized(),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Report server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // A rejected credential sends the browser back to the login page
        if self.is_unauthorized() {
            return Redirect::to("/login").into_response();
        }

        let status = match &self {
            Self::Api(ApiError::Network(_)) | Self::Auth(AuthError::Api(ApiError::Network(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Api(_) | Self::Auth(AuthError::Api(_) | AuthError::MissingToken) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Auth(AuthError::Store(_)) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) | Self::Auth(AuthError::Store(_)) => {
                "Internal server error".to_string()
            }
            Self::Api(_) | Self::Auth(_) => "Rating service unavailable".to_string(),
            Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context for the signed-in account.
pub fn set_sentry_user(user_id: Option<&str>, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: user_id.map(String::from),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
