//! HTTP route handlers for the web client.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /                       - Login page (or own dashboard when signed in)
//! GET  /login                  - Login page
//! POST /login                  - Login action, redirects via the role router
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action
//! POST /logout                 - Logout action
//!
//! # Admin (ADMIN only)
//! GET  /admin                  - Totals, add forms, filtered user list, store list
//! POST /admin/users            - Create a user
//! POST /admin/stores           - Create a store
//!
//! # User (USER only)
//! GET  /user                   - Filtered store list with overall and own rating
//! POST /user/ratings           - Submit or update own rating
//!
//! # Store owner (STORE_OWNER only)
//! GET  /stores                 - Own store, its average and its ratings
//!
//! # Account (any signed-in role)
//! POST /account/password       - Change password
//! ```
//!
//! Every mutation answers with a redirect, so the following GET renders
//! from freshly fetched data.

pub mod account;
pub mod admin;
pub mod auth;
pub mod owner;
pub mod user;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::session::SESSION_EXPIRED_MESSAGE;
use crate::state::AppState;

/// Create the application router (without layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::login_page))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/admin", get(admin::dashboard))
        .route("/admin/users", post(admin::create_user))
        .route("/admin/stores", post(admin::create_store))
        .route("/user", get(user::dashboard))
        .route("/user/ratings", post(user::rate))
        .route("/stores", get(owner::dashboard))
        .route("/account/password", post(account::update_password))
}

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect to `path` with a message in the query string.
fn redirect_with(path: &str, key: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?{key}={}", urlencoding::encode(message))).into_response()
}

/// Redirect to `path`, showing `message` as an error.
pub(crate) fn redirect_error(path: &str, message: &str) -> Response {
    redirect_with(path, "error", message)
}

/// Redirect to `path`, showing `message` as a confirmation.
pub(crate) fn redirect_success(path: &str, message: &str) -> Response {
    redirect_with(path, "success", message)
}

/// Handle a credential the API rejected: clear it and send the browser to
/// the login page with a notice.
pub(crate) async fn expire_session(state: &AppState, session: Session) -> Response {
    let lifecycle = state.lifecycle(session);
    if let Err(e) = lifecycle.expire().await {
        tracing::error!(error = %e, "Failed to clear expired session");
    }
    if let Err(e) = lifecycle.store().set_login_notice(SESSION_EXPIRED_MESSAGE).await {
        tracing::warn!(error = %e, "Failed to store login notice");
    }
    crate::error::clear_sentry_user();
    Redirect::to("/login").into_response()
}
