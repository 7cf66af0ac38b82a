//! Store Rating Core - Shared domain library.
//!
//! This crate provides the types and rating logic used by every store rating
//! client:
//! - `web` - Server-rendered dashboards for users, admins and store owners
//! - `cli` - Terminal client (`srate`) over the same API
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session storage. Everything here is deterministic over its
//! inputs and can be tested without a network.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, roles and star values
//! - [`models`] - Users, stores and ratings as returned by the API
//! - [`aggregate`] - Store averages and the per-account rating index
//! - [`filter`] - Case-insensitive list filtering
//! - [`routing`] - Role to dashboard mapping
//! - [`validation`] - Form checks run before any request

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod filter;
pub mod models;
pub mod routing;
pub mod types;
pub mod validation;

pub use aggregate::{AverageRating, RatingIndex, StoreAggregate, aggregate, aggregate_all};
pub use filter::{FilterField, FilterSet, Filterable};
pub use models::{Rating, RatingAuthor, Store, User};
pub use routing::{Dashboard, route_for_claim, route_for_role};
pub use types::*;
pub use validation::{RegistrationForm, StoreForm, ValidationError};
