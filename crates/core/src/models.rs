//! Entities returned by the rating API.
//!
//! Field names follow the API's camelCase JSON. The API is owned elsewhere,
//! so decoding is tolerant: `_id` is accepted for `id`, and fields the
//! client only displays default to empty when absent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, RatingId, Role, Stars, StoreId, UserId};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: Role,
}

/// A rateable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(alias = "_id")]
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    /// Non-owning reference to the owning account, if the API reports one.
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// Average precomputed by the API, if it reports one.
    #[serde(default)]
    pub average_rating: Option<Decimal>,
}

/// Name of the account that submitted a rating, when the API embeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingAuthor {
    pub name: String,
}

/// One account's rating of one store.
///
/// The API guarantees at most one rating per (user, store) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(alias = "_id")]
    pub id: RatingId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub store_id: StoreId,
    #[serde(rename = "rating")]
    pub value: Stars,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub user: Option<RatingAuthor>,
}

impl Rating {
    /// Display name of the rater, if the API embedded one.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str())
    }

    /// Comment text, or `None` if absent or blank.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.trim().is_empty())
    }
}
