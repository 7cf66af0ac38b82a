//! Newtype IDs for type-safe entity references.
//!
//! The rating API owns identity. Depending on the backing store it hands out
//! numeric keys or opaque strings, so an ID keeps whichever JSON form it was
//! received in and sends it back unchanged.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Wire form of an ID as received from the rating API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Numeric key (e.g., an auto-increment column).
    Number(i64),
    /// Opaque string key (e.g., a UUID or document ID).
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`RawId`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Display` (used for URL path segments and form values)
/// - `From<i64>`, `From<&str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use store_rating_core::define_id;
/// define_id!(UserId);
/// define_id!(StoreId);
///
/// let user_id = UserId::from(1);
/// let store_id = StoreId::from("65f1c0ffee");
///
/// assert_eq!(user_id.to_string(), "1");
/// // These are different types, so this won't compile:
/// // let _: UserId = store_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($crate::types::id::RawId);

        impl $name {
            /// Create an ID from its wire form.
            #[must_use]
            pub const fn new(raw: $crate::types::id::RawId) -> Self {
                Self(raw)
            }

            /// Get the wire form of the ID.
            #[must_use]
            pub const fn raw(&self) -> &$crate::types::id::RawId {
                &self.0
            }

            /// Encode the ID for a form field, keeping its wire form.
            #[must_use]
            pub fn to_form_value(&self) -> String {
                ::serde_json::to_string(&self.0).unwrap_or_else(|_| self.0.to_string())
            }

            /// Decode an ID previously encoded with `to_form_value`.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is not a JSON number or string.
            pub fn from_form_value(value: &str) -> ::core::result::Result<Self, ::serde_json::Error> {
                ::serde_json::from_str(value).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self($crate::types::id::RawId::Number(id))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self($crate::types::id::RawId::Text(id.to_owned()))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self($crate::types::id::RawId::Text(id))
            }
        }
    };
}

define_id!(UserId);
define_id!(StoreId);
define_id!(RatingId);
