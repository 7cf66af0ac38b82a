//! Submit-or-update and aggregation tests against the stub API.
//!
//! Run with: cargo test -p store-rating-integration-tests

use secrecy::SecretString;

use store_rating_core::{
    AverageRating, RatingId, RatingIndex, Stars, StoreId, aggregate,
};
use store_rating_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, OWNER_EMAIL, OWNER_PASSWORD, StubApi, USER_EMAIL, USER_PASSWORD,
};
use store_rating_web::api::AuthorizedClient;
use store_rating_web::services::dashboard::{owner_store, store_rows};
use store_rating_web::services::rating::{SubmitAction, submit_rating};
use store_rating_web::session::CurrentSession;

/// Sign in through the gateway and return the session.
async fn sign_in(api: &StubApi, email: &str, password: &str) -> CurrentSession {
    let response = api
        .client()
        .login(email, &SecretString::from(password))
        .await
        .expect("login succeeds");
    let user = response.user.expect("user returned");
    CurrentSession::new(
        response.token.expect("token returned"),
        user.id,
        user.name,
        user.email,
        user.role,
    )
}

async fn my_index(client: &AuthorizedClient) -> RatingIndex {
    RatingIndex::from_ratings(client.my_ratings().await.expect("ratings load"))
}

fn stars(value: i64) -> Stars {
    Stars::new(value).expect("valid star value")
}

#[tokio::test]
async fn test_create_then_update_keeps_rating_id() {
    let api = StubApi::start().await;
    let client = sign_in(&api, USER_EMAIL, USER_PASSWORD).await.client(&api.client());
    let deli = StoreId::from("s-2");

    let index = my_index(&client).await;
    assert!(index.get(&deli).is_none());

    let first = submit_rating(&client, &deli, stars(5), &index)
        .await
        .expect("create succeeds");
    assert_eq!(first.action, SubmitAction::Created);
    assert!(first.resynced);
    let created = first.index.get(&deli).expect("new rating indexed").clone();
    assert_eq!(created.value, stars(5));

    let second = submit_rating(&client, &deli, stars(3), &first.index)
        .await
        .expect("update succeeds");
    assert_eq!(second.action, SubmitAction::Updated(created.id.clone()));
    let updated = second.index.get(&deli).expect("rating still indexed");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.value, stars(3));

    // One rating per store on the server side too.
    let stored = api.state().ratings_by(2);
    assert_eq!(stored.iter().filter(|r| r.store_id == "s-2").count(), 1);
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_existing_rating_is_updated() {
    let api = StubApi::start().await;
    let client = sign_in(&api, USER_EMAIL, USER_PASSWORD).await.client(&api.client());
    let books = StoreId::from("s-1");

    let index = my_index(&client).await;
    let outcome = submit_rating(&client, &books, stars(2), &index)
        .await
        .expect("update succeeds");

    assert_eq!(outcome.action, SubmitAction::Updated(RatingId::from(1)));
    assert_eq!(outcome.index.get(&books).map(|r| r.value), Some(stars(2)));
    assert!(api.state().requests().contains(&"PUT /api/ratings/1".to_string()));
    assert!(!api.state().requests().contains(&"POST /api/ratings".to_string()));
}

#[tokio::test]
async fn test_failed_write_surfaces_server_message() {
    let api = StubApi::start().await;
    let client = sign_in(&api, USER_EMAIL, USER_PASSWORD).await.client(&api.client());

    let index = my_index(&client).await;
    let err = submit_rating(&client, &StoreId::from("s-404"), stars(4), &index)
        .await
        .expect_err("unknown store is refused");

    assert!(!err.is_unauthorized());
    assert_eq!(err.user_message("Error submitting rating."), "Store not found");
    // The caller's index is untouched.
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn test_write_with_revoked_token_is_unauthorized() {
    let api = StubApi::start().await;
    let client = sign_in(&api, USER_EMAIL, USER_PASSWORD).await.client(&api.client());
    let index = my_index(&client).await;

    api.state().revoke_all_tokens();

    let err = submit_rating(&client, &StoreId::from("s-2"), stars(4), &index)
        .await
        .expect_err("revoked token is refused");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_admin_store_rows_count_and_average() {
    let api = StubApi::start().await;
    let user = sign_in(&api, USER_EMAIL, USER_PASSWORD).await.client(&api.client());
    let index = my_index(&user).await;
    submit_rating(&user, &StoreId::from("s-2"), stars(3), &index)
        .await
        .expect("create succeeds");

    let admin = sign_in(&api, ADMIN_EMAIL, ADMIN_PASSWORD).await.client(&api.client());
    let (stores, ratings) = tokio::join!(admin.stores(), admin.all_ratings());
    let ratings = ratings.expect("ratings load");
    let rows = store_rows(stores.expect("stores load"), Some(&ratings));

    let books = rows
        .iter()
        .find(|r| r.store.name == "Corner Books")
        .expect("store listed");
    assert_eq!(books.count, Some(1));
    assert_eq!(books.average.to_string(), "4.0");

    let deli = rows
        .iter()
        .find(|r| r.store.name == "Deli Delights")
        .expect("store listed");
    assert_eq!(deli.count, Some(1));
    assert_eq!(deli.average.to_string(), "3.0");
}

#[tokio::test]
async fn test_owner_store_summary() {
    let api = StubApi::start().await;
    let session = sign_in(&api, OWNER_EMAIL, OWNER_PASSWORD).await;
    let client = session.client(&api.client());

    let store = owner_store(
        client.stores().await.expect("stores load"),
        session.user_id.as_ref(),
    )
    .expect("owner has a store");
    let ratings = client.store_ratings(&store.id).await.expect("ratings load");
    let summary = aggregate(&ratings, &store.id);

    assert_eq!(summary.count, 1);
    assert!(matches!(summary.average, AverageRating::Rated(_)));
    assert_eq!(
        ratings.first().and_then(|r| r.author_name()),
        Some("Regular Shopper Account")
    );
}
