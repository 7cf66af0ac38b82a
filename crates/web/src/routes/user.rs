//! User dashboard route handlers.

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

use store_rating_core::{Dashboard, FilterField, FilterSet, RatingIndex, Stars, StoreId};

use super::{MessageQuery, expire_session, redirect_error, redirect_success};
use crate::filters;
use crate::middleware::{RequireSession, require_dashboard};
use crate::services::dashboard::{RateableStore, rateable_stores};
use crate::services::rating::{SubmitAction, submit_rating};
use crate::session::CurrentSession;
use crate::state::AppState;

/// Fields the store list can be searched by.
pub const STORE_FILTER_FIELDS: [FilterField; 2] = [FilterField::Name, FilterField::Address];

/// Shown when a rating write fails without a message from the API.
const RATING_FALLBACK_MESSAGE: &str = "Error submitting rating.";

/// Rating form data.
///
/// `store_id` carries [`StoreId::to_form_value`] output.
#[derive(Debug, Deserialize)]
pub struct RateForm {
    pub store_id: String,
    #[serde(default)]
    pub rating: String,
}

/// A choice in a row's rating select.
#[derive(Debug, Clone)]
pub struct StarOption {
    pub value: u8,
    pub selected: bool,
}

/// One row of the store table.
#[derive(Debug, Clone)]
pub struct StoreRowView {
    pub store_value: String,
    pub options: Vec<StarOption>,
    pub row: RateableStore,
}

impl From<RateableStore> for StoreRowView {
    fn from(row: RateableStore) -> Self {
        let options = Stars::all()
            .map(|stars| StarOption {
                value: stars.get(),
                selected: row.mine == Some(stars),
            })
            .collect();
        Self {
            store_value: row.store.id.to_form_value(),
            options,
            row,
        }
    }
}

/// User dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "user.html")]
pub struct UserTemplate {
    pub current: CurrentSession,
    pub error: Option<String>,
    pub success: Option<String>,
    pub load_errors: Vec<String>,
    pub search: FilterSet,
    pub stores: Vec<StoreRowView>,
}

/// User dashboard.
///
/// GET /user
#[instrument(skip_all, fields(role = %current.role))]
pub async fn dashboard(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<FilterSet>,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Err(redirect) = require_dashboard(&current, Dashboard::User) {
        return redirect;
    }

    let client = current.client(state.api());
    let (stores, mine) = tokio::join!(client.stores(), client.my_ratings());

    let rejected = matches!(&stores, Err(e) if e.is_unauthorized())
        || matches!(&mine, Err(e) if e.is_unauthorized());
    if rejected {
        return expire_session(&state, session).await;
    }

    let mut load_errors = Vec::new();
    let stores = stores.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error fetching stores");
        load_errors.push("Could not load stores.".to_string());
        Vec::new()
    });
    let index = match mine {
        Ok(ratings) => RatingIndex::from_ratings(ratings),
        Err(e) => {
            tracing::error!(error = %e, "Error fetching user ratings");
            load_errors.push("Could not load your ratings.".to_string());
            RatingIndex::default()
        }
    };

    let search = filters.restricted_to(&STORE_FILTER_FIELDS);
    let rows = rateable_stores(&stores, &index, &search)
        .into_iter()
        .map(StoreRowView::from)
        .collect();

    UserTemplate {
        current,
        error: query.error,
        success: query.success,
        load_errors,
        search,
        stores: rows,
    }
    .into_response()
}

/// Submit or update the caller's rating for a store.
///
/// POST /user/ratings
#[instrument(skip(current, state, session, form))]
pub async fn rate(
    RequireSession(current): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RateForm>,
) -> Response {
    if let Err(redirect) = require_dashboard(&current, Dashboard::User) {
        return redirect;
    }

    let Ok(store) = StoreId::from_form_value(&form.store_id) else {
        return redirect_error("/user", "Unknown store.");
    };
    let value = match form.rating.trim().parse::<i64>().map(Stars::new) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => return redirect_error("/user", &e.to_string()),
        Err(_) => return redirect_error("/user", "Please choose a rating."),
    };

    let client = current.client(state.api());

    // The index is rebuilt per request; the API is the only copy.
    let existing = match client.my_ratings().await {
        Ok(ratings) => RatingIndex::from_ratings(ratings),
        Err(e) if e.is_unauthorized() => return expire_session(&state, session).await,
        Err(e) => {
            tracing::error!(error = %e, "Error fetching user ratings");
            return redirect_error("/user", &e.user_message(RATING_FALLBACK_MESSAGE));
        }
    };

    match submit_rating(&client, &store, value, &existing).await {
        Ok(outcome) => {
            let message = match outcome.action {
                SubmitAction::Created => "Rating submitted.",
                SubmitAction::Updated(_) => "Rating updated.",
            };
            redirect_success("/user", message)
        }
        Err(e) if e.is_unauthorized() => expire_session(&state, session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Error submitting rating");
            redirect_error("/user", &e.user_message(RATING_FALLBACK_MESSAGE))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use store_rating_core::Store;

    fn rateable(mine: Option<i64>) -> RateableStore {
        RateableStore {
            store: Store {
                id: StoreId::from("s-1"),
                name: "Corner Books".to_string(),
                email: String::new(),
                address: "2 Elm Road".to_string(),
                owner_id: None,
                average_rating: None,
            },
            overall: store_rating_core::AverageRating::Unrated,
            mine: mine.map(|v| Stars::new(v).unwrap()),
        }
    }

    #[test]
    fn test_row_view_marks_own_rating() {
        let view = StoreRowView::from(rateable(Some(4)));
        assert_eq!(view.store_value, "\"s-1\"");
        assert_eq!(view.options.len(), 5);
        let selected: Vec<u8> = view
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec![4]);

        let unrated = StoreRowView::from(rateable(None));
        assert!(unrated.options.iter().all(|o| !o.selected));
    }
}
