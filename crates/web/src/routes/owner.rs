//! Store owner dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use store_rating_core::{Dashboard, Rating, Store, StoreAggregate, aggregate};

use super::{MessageQuery, expire_session};
use crate::filters;
use crate::middleware::{RequireSession, require_dashboard};
use crate::services::dashboard::owner_store;
use crate::session::CurrentSession;
use crate::state::AppState;

/// A rating as listed for the store owner.
#[derive(Debug, Clone)]
pub struct RatingRow {
    pub author: String,
    pub value: u8,
    pub comment: String,
}

impl From<&Rating> for RatingRow {
    fn from(rating: &Rating) -> Self {
        Self {
            author: rating.author_name().unwrap_or("Unknown").to_string(),
            value: rating.value.get(),
            comment: rating.comment_text().unwrap_or("No Comment").to_string(),
        }
    }
}

/// Store owner dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "owner.html")]
pub struct OwnerTemplate {
    pub current: CurrentSession,
    pub error: Option<String>,
    pub success: Option<String>,
    pub load_errors: Vec<String>,
    pub store: Option<Store>,
    pub summary: Option<StoreAggregate>,
    pub ratings: Vec<RatingRow>,
}

/// Store owner dashboard.
///
/// GET /stores
#[instrument(skip_all, fields(role = %current.role))]
pub async fn dashboard(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Err(redirect) = require_dashboard(&current, Dashboard::StoreOwner) {
        return redirect;
    }

    let client = current.client(state.api());
    let mut load_errors = Vec::new();

    let store = match client.stores().await {
        Ok(stores) => owner_store(stores, current.user_id.as_ref()),
        Err(e) if e.is_unauthorized() => return expire_session(&state, session).await,
        Err(e) => {
            tracing::error!(error = %e, "Error fetching store data");
            load_errors.push("Could not load your store.".to_string());
            None
        }
    };

    let (summary, ratings) = match &store {
        Some(store) => match client.store_ratings(&store.id).await {
            Ok(ratings) => (
                Some(aggregate(&ratings, &store.id)),
                ratings.iter().map(RatingRow::from).collect(),
            ),
            Err(e) if e.is_unauthorized() => return expire_session(&state, session).await,
            Err(e) => {
                tracing::error!(error = %e, store_id = %store.id, "Error fetching store ratings");
                load_errors.push("Could not load ratings.".to_string());
                (None, Vec::new())
            }
        },
        None => (None, Vec::new()),
    };

    OwnerTemplate {
        current,
        error: query.error,
        success: query.success,
        load_errors,
        store,
        summary,
        ratings,
    }
    .into_response()
}
