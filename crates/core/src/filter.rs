//! Client-side filter predicate for list views.
//!
//! A filter set holds at most one value per field. Every non-empty value
//! must appear in the entity's field as a case-insensitive substring; empty
//! values impose no constraint. The predicate is pure and cheap enough to
//! re-run against the full list on every change.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::models::{Store, User};

/// A field a list can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Name,
    Email,
    Address,
    Role,
}

/// An entity that exposes filterable fields.
pub trait Filterable {
    /// Value of `field`, or `None` if the entity has no such field.
    ///
    /// A non-empty filter on a field the entity lacks never matches.
    fn field_value(&self, field: FilterField) -> Option<Cow<'_, str>>;
}

impl Filterable for User {
    fn field_value(&self, field: FilterField) -> Option<Cow<'_, str>> {
        Some(match field {
            FilterField::Name => Cow::Borrowed(self.name.as_str()),
            FilterField::Email => Cow::Borrowed(self.email.as_str()),
            FilterField::Address => Cow::Borrowed(self.address.as_str()),
            FilterField::Role => Cow::Borrowed(self.role.as_str()),
        })
    }
}

impl Filterable for Store {
    fn field_value(&self, field: FilterField) -> Option<Cow<'_, str>> {
        match field {
            FilterField::Name => Some(Cow::Borrowed(self.name.as_str())),
            FilterField::Email => Some(Cow::Borrowed(self.email.as_str())),
            FilterField::Address => Some(Cow::Borrowed(self.address.as_str())),
            FilterField::Role => None,
        }
    }
}

/// Filter values keyed by field.
///
/// Deserializes directly from query parameters (`?name=..&role=..`);
/// missing parameters are empty filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: String,
}

impl FilterSet {
    /// Filter value for `field` (possibly empty).
    #[must_use]
    pub fn value(&self, field: FilterField) -> &str {
        match field {
            FilterField::Name => &self.name,
            FilterField::Email => &self.email,
            FilterField::Address => &self.address,
            FilterField::Role => &self.role,
        }
    }

    /// Keep only the given fields, clearing the rest.
    ///
    /// Views call this so that parameters for fields they do not offer
    /// cannot narrow their list.
    #[must_use]
    pub fn restricted_to(mut self, fields: &[FilterField]) -> Self {
        for field in [
            FilterField::Name,
            FilterField::Email,
            FilterField::Address,
            FilterField::Role,
        ] {
            if !fields.contains(&field) {
                match field {
                    FilterField::Name => self.name.clear(),
                    FilterField::Email => self.email.clear(),
                    FilterField::Address => self.address.clear(),
                    FilterField::Role => self.role.clear(),
                }
            }
        }
        self
    }

    /// Whether every filter value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.address.is_empty() && self.role.is_empty()
    }

    /// Borrow the entities of `items` that match this filter set.
    pub fn apply<'a, T: Filterable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| matches(*item, self)).collect()
    }
}

/// Whether `entity` satisfies every non-empty filter in `filters`.
#[must_use]
pub fn matches<T: Filterable + ?Sized>(entity: &T, filters: &FilterSet) -> bool {
    [
        FilterField::Name,
        FilterField::Email,
        FilterField::Address,
        FilterField::Role,
    ]
    .into_iter()
    .all(|field| {
        let wanted = filters.value(field);
        if wanted.is_empty() {
            return true;
        }
        entity
            .field_value(field)
            .is_some_and(|actual| actual.to_lowercase().contains(&wanted.to_lowercase()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Email, Role, StoreId, UserId};

    fn user(name: &str, email: &str, address: &str, role: Role) -> User {
        User {
            id: UserId::from(1),
            name: name.to_owned(),
            email: Email::parse(email).unwrap(),
            address: address.to_owned(),
            role,
        }
    }

    fn store(name: &str, address: &str) -> Store {
        Store {
            id: StoreId::from(1),
            name: name.to_owned(),
            email: "shop@example.com".to_owned(),
            address: address.to_owned(),
            owner_id: None,
            average_rating: None,
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let filters = FilterSet::default();
        assert!(filters.is_empty());
        assert!(matches(
            &user("Alice", "alice@example.com", "", Role::User),
            &filters
        ));
        assert!(matches(&store("", ""), &filters));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let filters = FilterSet {
            name: "LIC".to_owned(),
            ..FilterSet::default()
        };
        assert!(matches(
            &user("Alice", "alice@example.com", "", Role::User),
            &filters
        ));
    }

    #[test]
    fn test_one_mismatch_excludes() {
        let u = user("Alice", "alice@example.com", "12 High Street", Role::Admin);
        let filters = FilterSet {
            name: "alice".to_owned(),
            email: "example".to_owned(),
            address: "low street".to_owned(),
            role: "admin".to_owned(),
        };
        assert!(!matches(&u, &filters));
    }

    #[test]
    fn test_all_fields_combined_with_and() {
        let u = user("Alice", "alice@example.com", "12 High Street", Role::StoreOwner);
        let filters = FilterSet {
            name: "ali".to_owned(),
            email: "@EXAMPLE".to_owned(),
            address: "high".to_owned(),
            role: "owner".to_owned(),
        };
        assert!(matches(&u, &filters));
    }

    #[test]
    fn test_absent_field_with_filter_excludes() {
        let filters = FilterSet {
            role: "user".to_owned(),
            ..FilterSet::default()
        };
        assert!(!matches(&store("Corner Shop", "Main St"), &filters));
    }

    #[test]
    fn test_restricted_to_clears_other_fields() {
        let filters = FilterSet {
            name: "corner".to_owned(),
            email: "nobody".to_owned(),
            address: "main".to_owned(),
            role: "admin".to_owned(),
        }
        .restricted_to(&[FilterField::Name, FilterField::Address]);
        assert_eq!(filters.email, "");
        assert_eq!(filters.role, "");
        assert!(matches(&store("Corner Shop", "1 Main St"), &filters));
    }

    #[test]
    fn test_apply_keeps_order() {
        let stores = vec![
            store("Alpha Books", "North"),
            store("Beta Cafe", "South"),
            store("Alpha Bakery", "South"),
        ];
        let filters = FilterSet {
            name: "alpha".to_owned(),
            ..FilterSet::default()
        };
        let names: Vec<&str> = filters
            .apply(&stores)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha Books", "Alpha Bakery"]);
    }

    #[test]
    fn test_deserialize_from_partial_query() {
        let filters: FilterSet = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(filters.name, "x");
        assert!(filters.address.is_empty());
    }
}
