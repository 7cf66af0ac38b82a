//! Admin commands: list and create users and stores.

use store_rating_core::{
    Dashboard, FilterField, FilterSet, RegistrationForm, Role, StoreForm, User,
};
use store_rating_web::services::dashboard::{owner_candidates, store_rows};

use super::{CliError, Context};
use crate::output::{render_table, say};

/// Fields the user list can be filtered by.
const USER_FILTER_FIELDS: [FilterField; 4] = [
    FilterField::Name,
    FilterField::Email,
    FilterField::Address,
    FilterField::Role,
];

/// List users matching `filters`.
///
/// # Errors
///
/// Returns an error without an admin session or if the list cannot be
/// loaded.
pub async fn users(ctx: &Context, filters: FilterSet) -> Result<(), CliError> {
    let session = ctx.session_for(Dashboard::Admin).await?;
    let client = session.client(ctx.lifecycle().api());
    let users = ctx.settle(client.users().await, "Could not load users.").await?;

    let filters = filters.restricted_to(&USER_FILTER_FIELDS);
    let matching = filters.apply(&users);
    let rows: Vec<Vec<String>> = matching
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.name.clone(),
                u.email.to_string(),
                u.address.clone(),
                u.role.label().to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        say("No users found.");
    } else {
        say(&render_table(
            &["ID", "Name", "Email", "Address", "Role"],
            &rows,
        ));
    }
    say(&format!("{} of {} users", matching.len(), users.len()));
    Ok(())
}

/// List stores with rating count and average.
///
/// If the rating list cannot be loaded the API-reported averages are shown
/// instead.
///
/// # Errors
///
/// Returns an error without an admin session or if the stores cannot be
/// loaded.
pub async fn stores(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.session_for(Dashboard::Admin).await?;
    let client = session.client(ctx.lifecycle().api());

    let (stores, ratings) = tokio::join!(client.stores(), client.all_ratings());
    let stores = ctx.settle(stores, "Could not load stores.").await?;
    let ratings = match ctx.settle(ratings, "Could not load ratings.").await {
        Ok(ratings) => Some(ratings),
        Err(CliError::Rejected(message)) => {
            tracing::warn!(%message, "Showing reported averages");
            say(&message);
            None
        }
        Err(e) => return Err(e),
    };

    let total_stores = stores.len();
    let rows: Vec<Vec<String>> = store_rows(stores, ratings.as_deref())
        .into_iter()
        .map(|row| {
            vec![
                row.store.id.to_string(),
                row.store.name,
                row.store.email,
                row.store.address,
                row.count.map_or_else(|| "?".to_string(), |c| c.to_string()),
                row.average.to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        say("No stores found.");
    } else {
        say(&render_table(
            &["ID", "Name", "Email", "Address", "Ratings", "Average"],
            &rows,
        ));
    }
    match ratings {
        Some(ratings) => say(&format!("{total_stores} stores, {} ratings", ratings.len())),
        None => say(&format!("{total_stores} stores")),
    }
    Ok(())
}

/// Create a user.
///
/// # Errors
///
/// Returns a validation error before any request, or the API's message if
/// it refuses.
pub async fn create_user(ctx: &Context, form: RegistrationForm) -> Result<(), CliError> {
    let session = ctx.session_for(Dashboard::Admin).await?;
    form.validate()?;

    let client = session.client(ctx.lifecycle().api());
    let created = ctx
        .settle(client.create_user(&form).await, "Error adding user.")
        .await?;

    let name = created.map_or(form.name, |u| u.name);
    say(&format!("User {name} added."));
    Ok(())
}

/// Pick the store owner an admin named by ID or email.
fn find_owner<'a>(users: &'a [User], key: &str) -> Option<&'a User> {
    let owners = owner_candidates(users);
    owners
        .iter()
        .find(|u| u.id.to_string() == key)
        .or_else(|| owners.iter().find(|u| u.email.as_str().eq_ignore_ascii_case(key)))
        .copied()
}

/// Create a store, optionally assigned to a store owner.
///
/// # Errors
///
/// Returns an error for an unknown owner, a validation error, or the API's
/// message if it refuses.
pub async fn create_store(
    ctx: &Context,
    name: String,
    email: String,
    address: String,
    owner: Option<&str>,
) -> Result<(), CliError> {
    let session = ctx.session_for(Dashboard::Admin).await?;
    let client = session.client(ctx.lifecycle().api());

    let owner_id = match owner {
        Some(key) => {
            let users = ctx.settle(client.users().await, "Could not load users.").await?;
            let owner = find_owner(&users, key).ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "No {} account matches {key}.",
                    Role::StoreOwner.label()
                ))
            })?;
            Some(owner.id.clone())
        }
        None => None,
    };

    let form = StoreForm {
        name,
        email: email.trim().to_string(),
        address,
        owner_id,
    };
    form.validate()?;

    let created = ctx
        .settle(client.create_store(&form).await, "Error adding store.")
        .await?;

    let name = created.map_or(form.name, |s| s.name);
    say(&format!("Store {name} added."));
    Ok(())
}
