//! Authentication route handlers.
//!
//! Handles login, signup and logout against the rating API. Signup input is
//! validated here first; an invalid form is re-rendered without any request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use store_rating_core::{RegistrationForm, Role};

use super::{MessageQuery, redirect_error, redirect_success};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::session::BrowserCredentialStore;
use crate::state::AppState;

/// Shown when signup fails without a message from the API.
const SIGNUP_FALLBACK_MESSAGE: &str = "Something went wrong!";

/// Shown on the login page after a successful signup.
const SIGNUP_SUCCESS_MESSAGE: &str = "Account created. Please log in.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// A role choice on the signup form.
#[derive(Debug, Clone)]
pub struct RoleOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Role choices with `selected` marked.
#[must_use]
pub fn role_options(selected: Role) -> Vec<RoleOption> {
    Role::ALL
        .iter()
        .map(|role| RoleOption {
            value: role.as_str(),
            label: role.label(),
            selected: *role == selected,
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub address: String,
    pub roles: Vec<RoleOption>,
}

impl SignupTemplate {
    fn blank(error: Option<String>) -> Self {
        Self {
            error,
            name: String::new(),
            email: String::new(),
            address: String::new(),
            roles: role_options(Role::default()),
        }
    }

    fn refill(form: &SignupForm, role: Role, error: String) -> Self {
        Self {
            error: Some(error),
            name: form.name.clone(),
            email: form.email.clone(),
            address: form.address.clone(),
            roles: role_options(role),
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// A signed-in account is sent straight to its dashboard.
///
/// GET / and GET /login
pub async fn login_page(
    OptionalSession(current): OptionalSession,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    if let Some(current) = current {
        return Ok(Redirect::to(current.dashboard().path()).into_response());
    }

    let notice = BrowserCredentialStore::new(session)
        .take_login_notice()
        .await?;

    Ok(LoginTemplate {
        error: query.error.or(notice),
        success: query.success,
    }
    .into_response())
}

/// Handle login form submission.
///
/// On success the role router picks the dashboard to redirect to.
///
/// POST /login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);

    match state.lifecycle(session).login(&form.email, &password).await {
        Ok(current) => {
            let user_id = current.user_id.as_ref().map(ToString::to_string);
            set_sentry_user(user_id.as_deref(), &current.email);
            Redirect::to(current.dashboard().path()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            redirect_error("/login", &e.user_message())
        }
    }
}

/// Logout and clear the session.
///
/// Purely local; the API is not told.
///
/// POST /logout
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Err(e) = state.lifecycle(session).logout().await {
        tracing::error!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();
    Redirect::to("/login").into_response()
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
///
/// GET /signup
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate::blank(query.error)
}

/// Handle signup form submission.
///
/// Validation failures re-render the form and send nothing to the API.
///
/// POST /signup
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let role = if form.role.is_empty() {
        Role::default()
    } else {
        match form.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                return SignupTemplate::refill(&form, Role::default(), e.to_string())
                    .into_response();
            }
        }
    };

    let registration = RegistrationForm {
        name: form.name.clone(),
        email: form.email.trim().to_string(),
        address: form.address.clone(),
        password: form.password.clone(),
        role,
    };

    if let Err(e) = registration.validate() {
        tracing::debug!(field = e.field(), "Signup rejected by validation");
        return SignupTemplate::refill(&form, role, e.to_string()).into_response();
    }

    match state.api().register(&registration).await {
        Ok(()) => {
            tracing::info!(role = %role, "Account registered");
            redirect_success("/login", SIGNUP_SUCCESS_MESSAGE)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Signup failed");
            SignupTemplate::refill(&form, role, e.user_message(SIGNUP_FALLBACK_MESSAGE))
                .into_response()
        }
    }
}
