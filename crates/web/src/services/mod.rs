//! Business logic between the gateway client and the views.
//!
//! - [`rating`] - Submit-or-update of the caller's rating
//! - [`dashboard`] - Display rows built from fetched lists

pub mod dashboard;
pub mod rating;
