//! Account route handlers.

use axum::{Form, extract::State, response::Response};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use store_rating_core::validation::validate_password;

use super::{redirect_error, redirect_success};
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Shown after the API accepted a password change.
const PASSWORD_UPDATED_MESSAGE: &str = "Password updated successfully.";

/// Shown when a password change fails without a message from the API.
const PASSWORD_FALLBACK_MESSAGE: &str = "Error updating password.";

/// Password change form data.
#[derive(Deserialize)]
pub struct PasswordForm {
    pub old_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordForm").finish_non_exhaustive()
    }
}

/// Change the caller's password, then return to their dashboard.
///
/// The new password is checked against the signup rules first. A 401 here
/// usually means a wrong current password, so it is shown as a message; a
/// credential that is really dead is caught by the dashboard load that
/// follows the redirect.
///
/// POST /account/password
#[instrument(skip_all, fields(role = %current.role))]
pub async fn update_password(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Response {
    let back = current.dashboard().path();

    if form.old_password.is_empty() {
        return redirect_error(back, "Please enter your current password.");
    }
    if let Err(e) = validate_password(&form.new_password) {
        return redirect_error(back, &e.to_string());
    }

    let old = SecretString::from(form.old_password);
    let new = SecretString::from(form.new_password);

    match current.client(state.api()).update_password(&old, &new).await {
        Ok(_) => {
            tracing::info!("Password updated");
            redirect_success(back, PASSWORD_UPDATED_MESSAGE)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Error updating password");
            redirect_error(back, &e.user_message(PASSWORD_FALLBACK_MESSAGE))
        }
    }
}
