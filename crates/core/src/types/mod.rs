//! Core types for the store rating client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod stars;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, RoleParseError};
pub use stars::{Stars, StarsError};
