//! Admin dashboard route handlers.
//!
//! The dashboard loads users, stores and every rating concurrently. A list
//! that fails to load is logged and shown as empty with a notice; the other
//! lists still render.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use store_rating_core::{
    Dashboard, FilterField, FilterSet, RegistrationForm, Role, StoreForm, User, UserId,
};

use super::auth::{RoleOption, role_options};
use super::{MessageQuery, expire_session, redirect_error, redirect_success};
use crate::api::ApiError;
use crate::filters;
use crate::middleware::{RequireSession, require_dashboard};
use crate::services::dashboard::{StoreRow, owner_candidates, store_rows};
use crate::session::CurrentSession;
use crate::state::AppState;

/// Fields the admin user list can be filtered by.
pub const USER_FILTER_FIELDS: [FilterField; 4] = [
    FilterField::Name,
    FilterField::Email,
    FilterField::Address,
    FilterField::Role,
];

// =============================================================================
// Form Types
// =============================================================================

/// "Add user" form data.
#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// "Add store" form data.
///
/// `owner_id` carries [`UserId::to_form_value`] output, or is empty.
#[derive(Debug, Deserialize)]
pub struct NewStoreForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub owner_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// A store owner choice on the "add store" form.
#[derive(Debug, Clone)]
pub struct OwnerOption {
    pub value: String,
    pub label: String,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub current: CurrentSession,
    pub error: Option<String>,
    pub success: Option<String>,
    pub load_errors: Vec<String>,
    pub total_users: usize,
    pub total_stores: usize,
    pub total_ratings: Option<usize>,
    pub users: Vec<User>,
    pub stores: Vec<StoreRow>,
    pub search: FilterSet,
    pub roles: Vec<RoleOption>,
    pub owners: Vec<OwnerOption>,
}

/// Unwrap a list fetch, logging and noting a failure.
fn loaded<T>(result: Result<Vec<T>, ApiError>, what: &str, notes: &mut Vec<String>) -> Option<Vec<T>> {
    match result {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::error!(error = %e, list = what, "Failed to load list");
            notes.push(format!("Could not load {what}."));
            None
        }
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Admin dashboard.
///
/// GET /admin
#[instrument(skip_all, fields(role = %current.role))]
pub async fn dashboard(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<FilterSet>,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Err(redirect) = require_dashboard(&current, Dashboard::Admin) {
        return redirect;
    }

    let client = current.client(state.api());
    let (users, stores, ratings) =
        tokio::join!(client.users(), client.stores(), client.all_ratings());

    let rejected = matches!(&users, Err(e) if e.is_unauthorized())
        || matches!(&stores, Err(e) if e.is_unauthorized())
        || matches!(&ratings, Err(e) if e.is_unauthorized());
    if rejected {
        return expire_session(&state, session).await;
    }

    let mut load_errors = Vec::new();
    let users = loaded(users, "users", &mut load_errors).unwrap_or_default();
    let stores = loaded(stores, "stores", &mut load_errors).unwrap_or_default();
    let ratings = loaded(ratings, "ratings", &mut load_errors);

    let filters = filters.restricted_to(&USER_FILTER_FIELDS);
    let owners = owner_candidates(&users)
        .into_iter()
        .map(|u| OwnerOption {
            value: u.id.to_form_value(),
            label: format!("{} ({})", u.name, u.email),
        })
        .collect();

    AdminTemplate {
        error: query.error,
        success: query.success,
        load_errors,
        total_users: users.len(),
        total_stores: stores.len(),
        total_ratings: ratings.as_ref().map(Vec::len),
        users: filters.apply(&users).into_iter().cloned().collect(),
        stores: store_rows(stores, ratings.as_deref()),
        search: filters,
        roles: role_options(Role::default()),
        owners,
        current,
    }
    .into_response()
}

/// Create a user.
///
/// POST /admin/users
#[instrument(skip(current, state, session, form), fields(email = %form.email))]
pub async fn create_user(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> Response {
    if let Err(redirect) = require_dashboard(&current, Dashboard::Admin) {
        return redirect;
    }

    let role = if form.role.is_empty() {
        Role::default()
    } else {
        match form.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => return redirect_error("/admin", &e.to_string()),
        }
    };
    let registration = RegistrationForm {
        name: form.name,
        email: form.email.trim().to_string(),
        address: form.address,
        password: form.password,
        role,
    };
    if let Err(e) = registration.validate() {
        return redirect_error("/admin", &e.to_string());
    }

    match current.client(state.api()).create_user(&registration).await {
        Ok(created) => {
            let name = created.map_or(registration.name, |u| u.name);
            tracing::info!(role = %role, "User created");
            redirect_success("/admin", &format!("User {name} added."))
        }
        Err(e) if e.is_unauthorized() => expire_session(&state, session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Error adding user");
            redirect_error("/admin", &e.user_message("Error adding user."))
        }
    }
}

/// Create a store.
///
/// POST /admin/stores
#[instrument(skip(current, state, session, form), fields(name = %form.name))]
pub async fn create_store(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewStoreForm>,
) -> Response {
    if let Err(redirect) = require_dashboard(&current, Dashboard::Admin) {
        return redirect;
    }

    let owner_id = if form.owner_id.is_empty() {
        None
    } else {
        match UserId::from_form_value(&form.owner_id) {
            Ok(id) => Some(id),
            Err(_) => return redirect_error("/admin", "Please choose a valid store owner."),
        }
    };
    let store = StoreForm {
        name: form.name,
        email: form.email.trim().to_string(),
        address: form.address,
        owner_id,
    };
    if let Err(e) = store.validate() {
        return redirect_error("/admin", &e.to_string());
    }

    match current.client(state.api()).create_store(&store).await {
        Ok(created) => {
            let name = created.map_or(store.name, |s| s.name);
            tracing::info!("Store created");
            redirect_success("/admin", &format!("Store {name} added."))
        }
        Err(e) if e.is_unauthorized() => expire_session(&state, session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Error adding store");
            redirect_error("/admin", &e.user_message("Error adding store."))
        }
    }
}
