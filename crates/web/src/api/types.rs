//! Request and response bodies of the rating API.
//!
//! Response types are tolerant: the API wraps some results in an envelope
//! (`{"user": {..}}`) and returns bare objects elsewhere, so both forms
//! decode.

use serde::{Deserialize, Serialize};

use store_rating_core::{Rating, Role, Stars, Store, StoreId, User, UserId};

/// `{"message": ..}` or `{"error": ..}` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    /// The message text, preferring `message` over `error`.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Account returned alongside the token on login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginUser {
    #[serde(default, alias = "_id")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Response of `POST /auth/login`.
///
/// Both fields are optional on the wire; a missing token is rejected by the
/// session lifecycle rather than by decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// Body of `PUT /auth/update-password`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// Body of `POST /ratings`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRating<'a> {
    pub store_id: &'a StoreId,
    pub rating: Stars,
}

/// Body of `PUT /ratings/{id}`.
#[derive(Debug, Serialize)]
pub struct RatingChange {
    pub rating: Stars,
}

/// A JSON value that is either a single item or an array of items.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Response of `POST /admin/user`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserCreated {
    Wrapped { user: User },
    Bare(User),
    Other(serde_json::Value),
}

impl UserCreated {
    /// The created user, if the API returned one.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => Some(user),
            Self::Other(_) => None,
        }
    }
}

/// Response of `POST /admin/stores`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoreCreated {
    Wrapped { store: Store },
    Bare(Store),
    Other(serde_json::Value),
}

impl StoreCreated {
    /// The created store, if the API returned one.
    #[must_use]
    pub fn into_store(self) -> Option<Store> {
        match self {
            Self::Wrapped { store } | Self::Bare(store) => Some(store),
            Self::Other(_) => None,
        }
    }
}

/// Response of `POST /ratings` and `PUT /ratings/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RatingWritten {
    Wrapped { rating: Rating },
    Bare(Rating),
    Other(serde_json::Value),
}

impl RatingWritten {
    /// The written rating, if the API returned one.
    #[must_use]
    pub fn into_rating(self) -> Option<Rating> {
        match self {
            Self::Wrapped { rating } | Self::Bare(rating) => Some(rating),
            Self::Other(_) => None,
        }
    }
}
