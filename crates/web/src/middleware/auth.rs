//! Authentication extractors and role gating.
//!
//! Extractors only read the stored session. Creating and clearing it is
//! left to [`SessionLifecycle`](crate::session::SessionLifecycle).

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use store_rating_core::Dashboard;

use crate::session::{BrowserCredentialStore, CredentialStore, CurrentSession};

/// Extractor that requires a signed-in account.
///
/// If nobody is signed in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(current): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.name)
/// }
/// ```
pub struct RequireSession(pub CurrentSession);

/// Error returned when a session is required but absent.
#[derive(Debug)]
pub enum SessionRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingLayer,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingLayer => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn load_current(parts: &Parts) -> Result<Option<CurrentSession>, SessionRejection> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(SessionRejection::MissingLayer)?;

    match BrowserCredentialStore::new(session).load().await {
        Ok(current) => Ok(current),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            Ok(None)
        }
    }
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        load_current(parts)
            .await?
            .map(Self)
            .ok_or(SessionRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current session.
///
/// Unlike `RequireSession`, this does not reject the request if nobody is
/// signed in.
pub struct OptionalSession(pub Option<CurrentSession>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(load_current(parts).await.ok().flatten()))
    }
}

/// Check that `current` belongs on `dashboard`.
///
/// # Errors
///
/// Returns a redirect to the session's own dashboard if its role routes
/// elsewhere.
pub fn require_dashboard(current: &CurrentSession, dashboard: Dashboard) -> Result<(), Response> {
    let own = current.dashboard();
    if own == dashboard {
        Ok(())
    } else {
        tracing::debug!(role = %current.role, requested = %dashboard, "Redirecting to own dashboard");
        Err(Redirect::to(own.path()).into_response())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;
    use store_rating_core::Role;

    #[test]
    fn test_require_dashboard() {
        let owner = CurrentSession::new("t", None, "Olive", "o@example.com", Role::StoreOwner);
        assert!(require_dashboard(&owner, Dashboard::StoreOwner).is_ok());

        let response = require_dashboard(&owner, Dashboard::Admin).unwrap_err();
        assert_eq!(response.headers()[LOCATION], "/stores");

        let user = CurrentSession::new("t", None, "Uma", "u@example.com", Role::User);
        let response = require_dashboard(&user, Dashboard::StoreOwner).unwrap_err();
        assert_eq!(response.headers()[LOCATION], "/user");
    }

    #[test]
    fn test_rejection_redirects_to_login() {
        let response = SessionRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login");
    }
}
