//! End-to-end tests of the web client against the stub API.
//!
//! A real browser-like client (cookies, redirects) drives the server-rendered
//! pages; the stub API records every request it receives.
//!
//! Run with: cargo test -p store-rating-integration-tests

use reqwest::{Client, Response, StatusCode};

use store_rating_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, OWNER_EMAIL, OWNER_PASSWORD, StubApi, USER_EMAIL, USER_PASSWORD,
    WebClient,
};

async fn sign_in(browser: &Client, web: &WebClient, email: &str, password: &str) -> Response {
    browser
        .post(web.url("/login"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("Failed to submit login")
}

async fn page(browser: &Client, web: &WebClient, path: &str) -> (String, String) {
    let resp = browser
        .get(web.url(path))
        .send()
        .await
        .expect("Failed to load page");
    let path = resp.url().path().to_string();
    let body = resp.text().await.expect("Failed to read response");
    (path, body)
}

fn api_calls(api: &StubApi, call: &str) -> usize {
    api.state().requests().iter().filter(|r| *r == call).count()
}

// ============================================================================
// Health & Headers
// ============================================================================

#[tokio::test]
async fn test_health_and_security_headers() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;

    let resp = WebClient::browser()
        .get(web.url("/health"))
        .send()
        .await
        .expect("Failed to call health");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-frame-options").map(|v| v.as_bytes()),
        Some(&b"DENY"[..])
    );
    assert_eq!(resp.text().await.expect("body"), "ok");
}

// ============================================================================
// Login & Role Routing
// ============================================================================

#[tokio::test]
async fn test_login_lands_on_role_dashboard() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;

    for (email, password, path, title) in [
        (ADMIN_EMAIL, ADMIN_PASSWORD, "/admin", "Admin Dashboard"),
        (USER_EMAIL, USER_PASSWORD, "/user", "User Dashboard"),
        (OWNER_EMAIL, OWNER_PASSWORD, "/stores", "Store Owner Dashboard"),
    ] {
        let browser = WebClient::browser();
        let resp = sign_in(&browser, &web, email, password).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.url().path(), path);
        assert!(resp.text().await.expect("body").contains(title));

        // A signed-in visit to the login page goes back to the dashboard.
        let (landed, _) = page(&browser, &web, "/login").await;
        assert_eq!(landed, path);
    }
}

#[tokio::test]
async fn test_bad_login_shows_api_message() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();

    let resp = sign_in(&browser, &web, USER_EMAIL, "Wrong123!").await;
    assert_eq!(resp.url().path(), "/login");
    assert!(resp.text().await.expect("body").contains("Invalid email or password"));
}

#[tokio::test]
async fn test_missing_token_shows_message() {
    let api = StubApi::start().await;
    api.state().with(|data| data.omit_token = true);
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();

    let resp = sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;
    assert_eq!(resp.url().path(), "/login");
    assert!(
        resp.text()
            .await
            .expect("body")
            .contains("Token not received. Please try again.")
    );
}

#[tokio::test]
async fn test_dashboards_are_role_gated() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;

    let (landed, _) = page(&WebClient::browser(), &web, "/admin").await;
    assert_eq!(landed, "/login");

    let browser = WebClient::browser();
    sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;
    let (landed, _) = page(&browser, &web, "/admin").await;
    assert_eq!(landed, "/user");
    let (landed, _) = page(&browser, &web, "/stores").await;
    assert_eq!(landed, "/user");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;

    let resp = browser
        .post(web.url("/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.url().path(), "/login");

    let (landed, _) = page(&browser, &web, "/user").await;
    assert_eq!(landed, "/login");
}

#[tokio::test]
async fn test_rejected_credential_expires_session() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    api.state().revoke_all_tokens();

    let (landed, body) = page(&browser, &web, "/admin").await;
    assert_eq!(landed, "/login");
    assert!(body.contains("Your session has expired. Please log in again."));

    // The notice is shown once and the session is gone.
    let (landed, body) = page(&browser, &web, "/admin").await;
    assert_eq!(landed, "/login");
    assert!(!body.contains("Your session has expired."));
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_invalid_signup_sends_no_request() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;

    let resp = WebClient::browser()
        .post(web.url("/signup"))
        .form(&[
            ("name", "Too short"),
            ("email", "short@example.com"),
            ("address", "1 Main Street"),
            ("password", "Abc123!@"),
            ("role", "USER"),
        ])
        .send()
        .await
        .expect("Failed to submit signup");

    let body = resp.text().await.expect("body");
    assert!(body.contains("Name must be between 20 and 60 characters."));
    assert!(body.contains("short@example.com"));
    assert_eq!(api_calls(&api, "POST /api/auth/register"), 0);
}

#[tokio::test]
async fn test_signup_then_login() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();

    let resp = browser
        .post(web.url("/signup"))
        .form(&[
            ("name", "Brand New Store Owner Person"),
            ("email", "fresh@example.com"),
            ("address", "8 Cedar Court"),
            ("password", "Fresh123!"),
            ("role", "STORE_OWNER"),
        ])
        .send()
        .await
        .expect("Failed to submit signup");
    assert_eq!(resp.url().path(), "/login");
    assert!(resp.text().await.expect("body").contains("Account created. Please log in."));
    assert_eq!(api_calls(&api, "POST /api/auth/register"), 1);

    let resp = sign_in(&browser, &web, "fresh@example.com", "Fresh123!").await;
    assert_eq!(resp.url().path(), "/stores");
}

// ============================================================================
// Admin Dashboard
// ============================================================================

#[tokio::test]
async fn test_admin_dashboard_survives_failed_list() {
    let api = StubApi::start().await;
    api.state().with(|data| data.fail_all_ratings = true);
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (landed, body) = page(&browser, &web, "/admin").await;
    assert_eq!(landed, "/admin");
    assert!(body.contains("Could not load ratings."));
    assert!(body.contains("Regular Shopper Account"));
    assert!(body.contains("Corner Books"));
}

#[tokio::test]
async fn test_admin_filters_users() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, body) = page(&browser, &web, "/admin?role=store").await;
    assert!(body.contains("Corner Books Store Owner"));
    assert!(!body.contains("Regular Shopper Account"));
}

#[tokio::test]
async fn test_admin_creates_user_and_store() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let resp = browser
        .post(web.url("/admin/users"))
        .form(&[
            ("name", "Second Store Owner Account"),
            ("email", "second@example.com"),
            ("address", "3 Pine Way"),
            ("password", "Second1!"),
            ("role", "STORE_OWNER"),
        ])
        .send()
        .await
        .expect("Failed to add user");
    assert_eq!(resp.url().path(), "/admin");
    let body = resp.text().await.expect("body");
    assert!(body.contains("User Second Store Owner Account added."));
    assert!(body.contains("second@example.com"));

    let resp = browser
        .post(web.url("/admin/stores"))
        .form(&[
            ("name", "Pine Hardware"),
            ("email", "hardware@example.com"),
            ("address", "3 Pine Way"),
            ("owner_id", "3"),
        ])
        .send()
        .await
        .expect("Failed to add store");
    let body = resp.text().await.expect("body");
    assert!(body.contains("Store Pine Hardware added."));
    assert!(body.contains("Pine Hardware"));

    let owner = api
        .state()
        .with(|data| data.stores.iter().find(|s| s.name == "Pine Hardware").and_then(|s| s.owner_id));
    assert_eq!(owner, Some(3));
}

#[tokio::test]
async fn test_admin_invalid_user_sends_no_request() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let resp = browser
        .post(web.url("/admin/users"))
        .form(&[
            ("name", "Valid Length Account Name"),
            ("email", "weak@example.com"),
            ("address", ""),
            ("password", "weakpass"),
            ("role", "USER"),
        ])
        .send()
        .await
        .expect("Failed to add user");
    assert!(resp.text().await.expect("body").contains("Password must be 8-16 characters long"));
    assert_eq!(api_calls(&api, "POST /api/admin/user"), 0);
}

// ============================================================================
// User Dashboard
// ============================================================================

#[tokio::test]
async fn test_user_rates_then_updates_store() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;

    let (_, body) = page(&browser, &web, "/user").await;
    assert!(body.contains("Deli Delights"));
    assert!(body.contains("Not rated"));

    let rate = |value: &'static str| {
        browser
            .post(web.url("/user/ratings"))
            .form(&[("store_id", "\"s-2\""), ("rating", value)])
            .send()
    };

    let body = rate("5").await.expect("Failed to rate").text().await.expect("body");
    assert!(body.contains("Rating submitted."));

    let body = rate("3").await.expect("Failed to rate").text().await.expect("body");
    assert!(body.contains("Rating updated."));

    let mine: Vec<_> = api
        .state()
        .ratings_by(2)
        .into_iter()
        .filter(|r| r.store_id == "s-2")
        .collect();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine.first().map(|r| r.rating), Some(3));
    assert_eq!(api_calls(&api, "POST /api/ratings"), 1);
}

#[tokio::test]
async fn test_user_search_filters_stores() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;

    let (_, body) = page(&browser, &web, "/user?address=oak").await;
    assert!(body.contains("Deli Delights"));
    assert!(!body.contains("Corner Books"));
}

#[tokio::test]
async fn test_out_of_range_rating_is_refused_locally() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;

    let resp = browser
        .post(web.url("/user/ratings"))
        .form(&[("store_id", "\"s-2\""), ("rating", "9")])
        .send()
        .await
        .expect("Failed to rate");
    assert_eq!(resp.url().path(), "/user");
    assert_eq!(api_calls(&api, "POST /api/ratings"), 0);
}

// ============================================================================
// Store Owner Dashboard & Account
// ============================================================================

#[tokio::test]
async fn test_owner_sees_store_ratings() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    let resp = sign_in(&browser, &web, OWNER_EMAIL, OWNER_PASSWORD).await;

    let body = resp.text().await.expect("body");
    assert!(body.contains("Corner Books"));
    assert!(body.contains("Regular Shopper Account"));
    assert!(body.contains("Great selection"));
    assert!(body.contains("4.0"));
}

#[tokio::test]
async fn test_wrong_current_password_keeps_session() {
    let api = StubApi::start().await;
    let web = WebClient::start(&api).await;
    let browser = WebClient::browser();
    sign_in(&browser, &web, USER_EMAIL, USER_PASSWORD).await;

    let resp = browser
        .post(web.url("/account/password"))
        .form(&[("old_password", "Nope123!"), ("new_password", "Better12!")])
        .send()
        .await
        .expect("Failed to change password");
    assert_eq!(resp.url().path(), "/user");
    assert!(resp.text().await.expect("body").contains("Old password is incorrect"));

    let resp = browser
        .post(web.url("/account/password"))
        .form(&[("old_password", USER_PASSWORD), ("new_password", "Better12!")])
        .send()
        .await
        .expect("Failed to change password");
    assert!(resp.text().await.expect("body").contains("Password updated successfully."));

    let fresh = WebClient::browser();
    let resp = sign_in(&fresh, &web, USER_EMAIL, "Better12!").await;
    assert_eq!(resp.url().path(), "/user");
}
