//! Store owner command: the owner's store and its ratings.

use store_rating_core::{Dashboard, aggregate};
use store_rating_web::services::dashboard::owner_store;

use super::{CliError, Context};
use crate::output::{render_table, say};

/// Show the caller's store, its average and every rating it received.
///
/// # Errors
///
/// Returns an error without a store owner session or if the store or its
/// ratings cannot be loaded.
pub async fn dashboard(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.session_for(Dashboard::StoreOwner).await?;
    let client = session.client(ctx.lifecycle().api());

    let stores = ctx
        .settle(client.stores().await, "Could not load your store.")
        .await?;
    let Some(store) = owner_store(stores, session.user_id.as_ref()) else {
        say("No store is assigned to your account.");
        return Ok(());
    };

    let ratings = ctx
        .settle(client.store_ratings(&store.id).await, "Could not load ratings.")
        .await?;
    let summary = aggregate(&ratings, &store.id);

    say(&store.name);
    say(&format!("Email:   {}", store.email));
    say(&format!("Address: {}", store.address));
    say(&format!(
        "Average: {} ({} ratings)",
        summary.average, summary.count
    ));

    if ratings.is_empty() {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = ratings
        .iter()
        .map(|r| {
            vec![
                r.author_name().unwrap_or("Unknown").to_string(),
                r.value.to_string(),
                r.comment_text().unwrap_or("No Comment").to_string(),
            ]
        })
        .collect();
    say("");
    say(&render_table(&["User", "Rating", "Comment"], &rows));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use store_rating_core::Role;

    #[tokio::test]
    async fn test_owner_dashboard_needs_owner_role() {
        let ctx = crate::commands::tests::context("owner-gate");
        crate::commands::tests::sign_in(&ctx, Role::Admin).await;
        let err = dashboard(&ctx).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::WrongDashboard {
                expected: Dashboard::StoreOwner,
                actual: Role::Admin
            }
        ));
        ctx.lifecycle().logout().await.unwrap();
    }
}
