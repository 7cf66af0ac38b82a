//! Integration test support for the store rating clients.
//!
//! [`StubApi`] is an in-process stand-in for the rating REST API, bound to
//! an ephemeral port and backed by in-memory data. Tests point the gateway
//! client, the session lifecycle or the whole web client at it and inspect
//! or tamper with its state through [`StubState`].
//!
//! # Seed Data
//!
//! | ID | Email | Password | Role |
//! |----|-------|----------|------|
//! | 1 | `admin@example.com` | `Admin123!` | `ADMIN` |
//! | 2 | `user@example.com` | `User123!` | `USER` |
//! | 3 | `owner@example.com` | `Owner123!` | `STORE_OWNER` |
//!
//! Stores `s-1` (Corner Books, owned by 3) and `s-2` (Deli Delights, no
//! owner). Rating 1 is account 2's 4-star rating of `s-1`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use store_rating_web::api::ApiClient;
use store_rating_web::config::{ApiConfig, WebConfig};
use store_rating_web::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "User123!";
pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OWNER_PASSWORD: &str = "Owner123!";

// =============================================================================
// Stub State
// =============================================================================

/// An account known to the stub.
#[derive(Debug, Clone)]
pub struct StubUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
    pub role: String,
}

impl StubUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "address": self.address,
            "role": self.role,
        })
    }
}

/// A store known to the stub. IDs are strings on the wire.
#[derive(Debug, Clone)]
pub struct StubStore {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<i64>,
}

/// A rating known to the stub.
#[derive(Debug, Clone)]
pub struct StubRating {
    pub id: i64,
    pub user_id: i64,
    pub store_id: String,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Everything the stub API stores.
#[derive(Debug, Default)]
pub struct StubData {
    pub users: Vec<StubUser>,
    pub stores: Vec<StubStore>,
    pub ratings: Vec<StubRating>,
    /// Issued bearer tokens and the account they belong to.
    pub tokens: HashMap<String, i64>,
    /// Answer logins without a token.
    pub omit_token: bool,
    /// Fail `GET /admin/ratings` with a 500.
    pub fail_all_ratings: bool,
    /// `METHOD /path` of every request received, in order.
    pub requests: Vec<String>,
    next_id: i64,
}

impl StubData {
    fn seeded() -> Self {
        let user = |id: i64, name: &str, email: &str, password: &str, role: &str| StubUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            address: format!("{id} Test Street"),
            password: password.to_string(),
            role: role.to_string(),
        };
        Self {
            users: vec![
                user(1, "Administrator Account Holder", ADMIN_EMAIL, ADMIN_PASSWORD, "ADMIN"),
                user(2, "Regular Shopper Account", USER_EMAIL, USER_PASSWORD, "USER"),
                user(3, "Corner Books Store Owner", OWNER_EMAIL, OWNER_PASSWORD, "STORE_OWNER"),
            ],
            stores: vec![
                StubStore {
                    id: "s-1".to_string(),
                    name: "Corner Books".to_string(),
                    email: "books@example.com".to_string(),
                    address: "2 Elm Road".to_string(),
                    owner_id: Some(3),
                },
                StubStore {
                    id: "s-2".to_string(),
                    name: "Deli Delights".to_string(),
                    email: "deli@example.com".to_string(),
                    address: "9 Oak Avenue".to_string(),
                    owner_id: None,
                },
            ],
            ratings: vec![StubRating {
                id: 1,
                user_id: 2,
                store_id: "s-1".to_string(),
                rating: 4,
                comment: Some("Great selection".to_string()),
            }],
            next_id: 100,
            ..Self::default()
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&StubUser> {
        self.users.iter().find(|u| u.id == id)
    }

    fn store_json(&self, store: &StubStore) -> Value {
        let values: Vec<i64> = self
            .ratings
            .iter()
            .filter(|r| r.store_id == store.id)
            .map(|r| r.rating)
            .collect();
        // Sent as a decimal string, one place.
        #[allow(clippy::cast_precision_loss)]
        let average = (!values.is_empty()).then(|| {
            format!("{:.1}", values.iter().sum::<i64>() as f64 / values.len() as f64)
        });
        json!({
            "id": store.id,
            "name": store.name,
            "email": store.email,
            "address": store.address,
            "ownerId": store.owner_id,
            "averageRating": average,
        })
    }

    fn rating_json(&self, rating: &StubRating) -> Value {
        let author = self.user(rating.user_id).map(|u| json!({ "name": u.name }));
        json!({
            "id": rating.id,
            "userId": rating.user_id,
            "storeId": rating.store_id,
            "rating": rating.rating,
            "comment": rating.comment,
            "user": author,
        })
    }
}

/// Shared handle on the stub's data.
#[derive(Debug, Clone)]
pub struct StubState {
    inner: Arc<Mutex<StubData>>,
}

impl StubState {
    fn new(data: StubData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    /// Run `f` with exclusive access to the data.
    pub fn with<R>(&self, f: impl FnOnce(&mut StubData) -> R) -> R {
        let mut data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn revoke_all_tokens(&self) {
        self.with(|data| data.tokens.clear());
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.with(|data| data.requests.clone())
    }

    /// Ratings `user_id` has submitted.
    #[must_use]
    pub fn ratings_by(&self, user_id: i64) -> Vec<StubRating> {
        self.with(|data| {
            data.ratings
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect()
        })
    }
}

// =============================================================================
// Stub Server
// =============================================================================

/// A running stub API.
pub struct StubApi {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StubApi {
    /// Start a seeded stub on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = StubState::new(StubData::seeded());
        let (addr, server) = serve(stub_router(state.clone())).await;
        Self {
            addr,
            state,
            server,
        }
    }

    /// API base URL, including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Gateway configuration pointing at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not parse.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::parse(&self.base_url()).expect("stub URL parses")
    }

    /// A gateway client for this stub.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_config()).expect("client builds")
    }

    #[must_use]
    pub const fn state(&self) -> &StubState {
        &self.state
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve(router: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener has an address");
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    (addr, server)
}

fn stub_router(state: StubState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/update-password", put(update_password))
        .route("/admin/users", get(list_users))
        .route("/admin/user", post(create_user))
        .route("/admin/stores", get(list_stores).post(create_store))
        .route("/admin/ratings", get(list_all_ratings))
        .route("/ratings", post(create_rating))
        .route("/ratings/{id}", put(update_rating))
        .route("/ratings/store/{id}", get(store_ratings))
        .route("/ratings/user", get(my_ratings));

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            record_request,
        ))
        .with_state(state)
}

async fn record_request(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    state.with(|data| data.requests.push(line));
    next.run(request).await
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn message(status: StatusCode, text: &str) -> Response {
    reply(status, json!({ "message": text }))
}

/// The account behind the request's bearer token.
fn caller(data: &StubData, headers: &HeaderMap) -> Option<StubUser> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    let id = data.tokens.get(token)?;
    data.user(*id).cloned()
}

fn text_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

// =============================================================================
// Stub Handlers
// =============================================================================

async fn login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let email = text_field(&body, "email");
    let password = text_field(&body, "password");

    state.with(|data| {
        let Some(user) = data
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned()
        else {
            return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
        };

        if data.omit_token {
            return reply(StatusCode::OK, json!({ "user": user.to_json() }));
        }

        let token = format!("token-{}-{}", user.id, data.next_id());
        data.tokens.insert(token.clone(), user.id);
        reply(StatusCode::OK, json!({ "token": token, "user": user.to_json() }))
    })
}

fn insert_user(data: &mut StubData, body: &Value) -> Result<StubUser, Response> {
    let email = text_field(body, "email");
    if data.users.iter().any(|u| u.email == email) {
        return Err(message(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let role = match text_field(body, "role") {
        "" => "USER",
        other => other,
    };
    let user = StubUser {
        id: data.next_id(),
        name: text_field(body, "name").to_string(),
        email: email.to_string(),
        address: text_field(body, "address").to_string(),
        password: text_field(body, "password").to_string(),
        role: role.to_string(),
    };
    data.users.push(user.clone());
    Ok(user)
}

async fn register(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.with(|data| match insert_user(data, &body) {
        Ok(_) => message(StatusCode::CREATED, "User registered successfully"),
        Err(response) => response,
    })
}

async fn update_password(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.with(|data| {
        let Some(user) = caller(data, &headers) else {
            return message(StatusCode::UNAUTHORIZED, "Unauthorized");
        };
        if user.password != text_field(&body, "oldPassword") {
            return message(StatusCode::UNAUTHORIZED, "Old password is incorrect");
        }
        let new_password = text_field(&body, "newPassword").to_string();
        if let Some(stored) = data.users.iter_mut().find(|u| u.id == user.id) {
            stored.password = new_password;
        }
        message(StatusCode::OK, "Password updated")
    })
}

async fn list_users(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.with(|data| match caller(data, &headers) {
        None => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Some(user) if user.role != "ADMIN" => message(StatusCode::FORBIDDEN, "Access denied"),
        Some(_) => reply(
            StatusCode::OK,
            Value::Array(data.users.iter().map(StubUser::to_json).collect()),
        ),
    })
}

async fn create_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.with(|data| match caller(data, &headers) {
        None => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Some(user) if user.role != "ADMIN" => message(StatusCode::FORBIDDEN, "Access denied"),
        Some(_) => match insert_user(data, &body) {
            Ok(created) => reply(
                StatusCode::CREATED,
                json!({ "message": "User created", "user": created.to_json() }),
            ),
            Err(response) => response,
        },
    })
}

/// Store owners get their own store as a single object; everyone else
/// gets the full list.
async fn list_stores(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.with(|data| {
        let Some(user) = caller(data, &headers) else {
            return message(StatusCode::UNAUTHORIZED, "Unauthorized");
        };
        if user.role == "STORE_OWNER" {
            return match data.stores.iter().find(|s| s.owner_id == Some(user.id)) {
                Some(store) => reply(StatusCode::OK, data.store_json(store)),
                None => reply(StatusCode::OK, json!([])),
            };
        }
        let stores: Vec<Value> = data.stores.iter().map(|s| data.store_json(s)).collect();
        reply(StatusCode::OK, Value::Array(stores))
    })
}

async fn create_store(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.with(|data| match caller(data, &headers) {
        None => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Some(user) if user.role != "ADMIN" => message(StatusCode::FORBIDDEN, "Access denied"),
        Some(_) => {
            let store = StubStore {
                id: format!("s-{}", data.next_id()),
                name: text_field(&body, "name").to_string(),
                email: text_field(&body, "email").to_string(),
                address: text_field(&body, "address").to_string(),
                owner_id: body.get("ownerId").and_then(Value::as_i64),
            };
            let created = data.store_json(&store);
            data.stores.push(store);
            reply(StatusCode::CREATED, created)
        }
    })
}

async fn list_all_ratings(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.with(|data| match caller(data, &headers) {
        None => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Some(user) if user.role != "ADMIN" => message(StatusCode::FORBIDDEN, "Access denied"),
        Some(_) if data.fail_all_ratings => {
            message(StatusCode::INTERNAL_SERVER_ERROR, "Ratings are unavailable")
        }
        Some(_) => {
            let ratings: Vec<Value> = data.ratings.iter().map(|r| data.rating_json(r)).collect();
            reply(StatusCode::OK, Value::Array(ratings))
        }
    })
}

async fn store_ratings(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.with(|data| {
        if caller(data, &headers).is_none() {
            return message(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        let ratings: Vec<Value> = data
            .ratings
            .iter()
            .filter(|r| r.store_id == id)
            .map(|r| data.rating_json(r))
            .collect();
        reply(StatusCode::OK, Value::Array(ratings))
    })
}

async fn my_ratings(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.with(|data| {
        let Some(user) = caller(data, &headers) else {
            return message(StatusCode::UNAUTHORIZED, "Unauthorized");
        };
        let ratings: Vec<Value> = data
            .ratings
            .iter()
            .filter(|r| r.user_id == user.id)
            .map(|r| data.rating_json(r))
            .collect();
        reply(StatusCode::OK, Value::Array(ratings))
    })
}

/// Enforces one rating per (account, store) pair.
async fn create_rating(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.with(|data| {
        let Some(user) = caller(data, &headers) else {
            return message(StatusCode::UNAUTHORIZED, "Unauthorized");
        };
        let store_id = text_field(&body, "storeId").to_string();
        if !data.stores.iter().any(|s| s.id == store_id) {
            return message(StatusCode::NOT_FOUND, "Store not found");
        }
        if data
            .ratings
            .iter()
            .any(|r| r.user_id == user.id && r.store_id == store_id)
        {
            return message(StatusCode::BAD_REQUEST, "You have already rated this store");
        }
        let rating = StubRating {
            id: data.next_id(),
            user_id: user.id,
            store_id,
            rating: body.get("rating").and_then(Value::as_i64).unwrap_or_default(),
            comment: None,
        };
        let created = data.rating_json(&rating);
        data.ratings.push(rating);
        reply(
            StatusCode::CREATED,
            json!({ "message": "Rating submitted", "rating": created }),
        )
    })
}

async fn update_rating(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.with(|data| {
        let Some(user) = caller(data, &headers) else {
            return message(StatusCode::UNAUTHORIZED, "Unauthorized");
        };
        let value = body.get("rating").and_then(Value::as_i64).unwrap_or_default();
        let Some(rating) = data
            .ratings
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user.id)
        else {
            return message(StatusCode::NOT_FOUND, "Rating not found");
        };
        rating.rating = value;
        let updated = rating.clone();
        reply(StatusCode::OK, data.rating_json(&updated))
    })
}

// =============================================================================
// Web Client Harness
// =============================================================================

/// A running web client wired to a stub API.
pub struct WebClient {
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl WebClient {
    /// Start the web client on an ephemeral port, talking to `api`.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built or no port can be
    /// bound.
    pub async fn start(api: &StubApi) -> Self {
        let config = WebConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: api.api_config(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).expect("application state builds");
        let (addr, server) = serve(store_rating_web::app(state)).await;
        Self { addr, server }
    }

    /// Absolute URL of `path` on the web client.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A browser-like HTTP client: keeps cookies and follows redirects.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Drop for WebClient {
    fn drop(&mut self) {
        self.server.abort();
    }
}
