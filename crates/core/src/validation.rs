//! Form validation applied before any request is issued.
//!
//! Checks run in a fixed order (name, address, password, email) and the
//! first failure wins, so a form shows one message at a time.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{Email, Role};

/// Characters a password is drawn from, with its length bounds.
static PASSWORD_ALPHABET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d!@#$%^&*]{8,16}$").expect("Invalid regex"));

/// Special characters, one of which every password must contain.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*";

pub const NAME_MIN: usize = 20;
pub const NAME_MAX: usize = 60;
pub const ADDRESS_MAX: usize = 400;

/// A form field failed its constraint.
///
/// Messages are shown to the user verbatim.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name must be between 20 and 60 characters.")]
    Name,
    #[error("Address must not exceed 400 characters.")]
    Address,
    #[error(
        "Password must be 8-16 characters long, include at least one uppercase letter and one special character."
    )]
    Password,
    #[error("Please enter a valid email address.")]
    Email,
}

impl ValidationError {
    /// Name of the offending form field.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Address => "address",
            Self::Password => "password",
            Self::Email => "email",
        }
    }
}

/// Check a display name's length in characters.
///
/// # Errors
///
/// Returns [`ValidationError::Name`] unless the name has 20 to 60 characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if (NAME_MIN..=NAME_MAX).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::Name)
    }
}

/// Check an address's length in characters.
///
/// # Errors
///
/// Returns [`ValidationError::Address`] if the address exceeds 400 characters.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.chars().count() <= ADDRESS_MAX {
        Ok(())
    } else {
        Err(ValidationError::Address)
    }
}

/// Check a password against the password policy.
///
/// 8-16 characters from letters, digits and `!@#$%^&*`, with at least one
/// uppercase letter and at least one special character.
///
/// # Errors
///
/// Returns [`ValidationError::Password`] if any part of the policy fails.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let ok = PASSWORD_ALPHABET.is_match(password)
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::Password)
    }
}

/// Parse an email address, mapping any failure to the form error.
///
/// # Errors
///
/// Returns [`ValidationError::Email`] if the address is not well formed.
pub fn validate_email(email: &str) -> Result<Email, ValidationError> {
    Email::parse(email).map_err(|_| ValidationError::Email)
}

/// Account details entered on the signup form or the admin "add user" form.
///
/// Serializes as the body of `POST /auth/register` and `POST /admin/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl RegistrationForm {
    /// Run every check in order and return the first failure.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first field that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_address(&self.address)?;
        validate_password(&self.password)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

/// Store details entered on the admin "add store" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<crate::types::UserId>,
}

impl StoreForm {
    /// Check the store's address and email.
    ///
    /// Store names are not subject to the account name length rule.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first field that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_address(&self.address)?;
        validate_email(&self.email)?;
        Ok(())
    }
}
