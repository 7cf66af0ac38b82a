//! Regular user commands: browse and rate stores.

use store_rating_core::{Dashboard, FilterField, FilterSet, RatingIndex, Stars, Store};
use store_rating_web::services::dashboard::rateable_stores;
use store_rating_web::services::rating::{SubmitAction, submit_rating};

use super::{CliError, Context};
use crate::output::{render_table, say};

/// Fields the store list can be searched by.
const STORE_FILTER_FIELDS: [FilterField; 2] = [FilterField::Name, FilterField::Address];

/// List stores with the overall and the caller's own rating.
///
/// # Errors
///
/// Returns an error without a user session or if the stores cannot be
/// loaded.
pub async fn stores(ctx: &Context, filters: FilterSet) -> Result<(), CliError> {
    let session = ctx.session_for(Dashboard::User).await?;
    let client = session.client(ctx.lifecycle().api());

    let (stores, mine) = tokio::join!(client.stores(), client.my_ratings());
    let stores = ctx.settle(stores, "Could not load stores.").await?;
    let index = match ctx.settle(mine, "Could not load your ratings.").await {
        Ok(ratings) => RatingIndex::from_ratings(ratings),
        Err(CliError::Rejected(message)) => {
            tracing::warn!(%message, "Showing stores without own ratings");
            say(&message);
            RatingIndex::default()
        }
        Err(e) => return Err(e),
    };

    let filters = filters.restricted_to(&STORE_FILTER_FIELDS);
    let rows: Vec<Vec<String>> = rateable_stores(&stores, &index, &filters)
        .into_iter()
        .map(|row| {
            vec![
                row.store.id.to_string(),
                row.store.name,
                row.store.address,
                row.overall.to_string(),
                row.mine.map_or_else(|| "-".to_string(), |s| s.to_string()),
            ]
        })
        .collect();

    if rows.is_empty() {
        say("No stores found.");
    } else {
        say(&render_table(
            &["ID", "Name", "Address", "Overall", "Your rating"],
            &rows,
        ));
    }
    Ok(())
}

/// Find a store by ID, or failing that by exact name (case-insensitive).
fn find_store<'a>(stores: &'a [Store], key: &str) -> Option<&'a Store> {
    stores
        .iter()
        .find(|s| s.id.to_string() == key)
        .or_else(|| stores.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
}

/// Submit or update the caller's rating for a store.
///
/// # Errors
///
/// Returns an error without a user session, for an unknown store or an
/// out-of-range value, or if the API refuses the write.
pub async fn rate(ctx: &Context, store: &str, value: i64) -> Result<(), CliError> {
    let value = Stars::new(value).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let session = ctx.session_for(Dashboard::User).await?;
    let client = session.client(ctx.lifecycle().api());

    let stores = ctx.settle(client.stores().await, "Could not load stores.").await?;
    let target = find_store(&stores, store).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "Unknown store: {store}. Run `srate stores` to list them."
        ))
    })?;

    let existing = ctx
        .settle(client.my_ratings().await, "Error submitting rating.")
        .await
        .map(RatingIndex::from_ratings)?;

    let outcome = ctx
        .settle(
            submit_rating(&client, &target.id, value, &existing).await,
            "Error submitting rating.",
        )
        .await?;

    let verb = match outcome.action {
        SubmitAction::Created => "submitted",
        SubmitAction::Updated(_) => "updated",
    };
    say(&format!("Rating {verb} for {}: {value}", target.name));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use store_rating_core::{Role, StoreId};

    fn store(id: StoreId, name: &str) -> Store {
        Store {
            id,
            name: name.to_string(),
            email: String::new(),
            address: String::new(),
            owner_id: None,
            average_rating: None,
        }
    }

    #[test]
    fn test_find_store_by_id_then_name() {
        let stores = vec![
            store(StoreId::from(3), "Corner Books"),
            store(StoreId::from("abc"), "3"),
        ];
        assert_eq!(find_store(&stores, "3").unwrap().name, "Corner Books");
        assert_eq!(find_store(&stores, "abc").unwrap().name, "3");
        assert_eq!(
            find_store(&stores, "corner books").unwrap().id,
            StoreId::from(3)
        );
        assert!(find_store(&stores, "missing").is_none());
    }

    #[tokio::test]
    async fn test_rate_rejects_out_of_range_before_session_check() {
        let ctx = crate::commands::tests::context("stars");
        let err = rate(&ctx, "1", 6).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_stores_needs_user_role() {
        let ctx = crate::commands::tests::context("user-gate");
        crate::commands::tests::sign_in(&ctx, Role::StoreOwner).await;
        let err = stores(&ctx, FilterSet::default()).await.unwrap_err();
        assert!(matches!(err, CliError::WrongDashboard { .. }));
        ctx.lifecycle().logout().await.unwrap();
    }
}
