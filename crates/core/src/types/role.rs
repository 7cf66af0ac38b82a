//! Account roles.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when a role string is not one of the known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected USER, ADMIN or STORE_OWNER)")]
pub struct RoleParseError(pub String);

/// Role of an account, as issued by the rating API.
///
/// Parsing user input is strict ([`str::parse`]). Decoding a role claim from
/// the API is lenient ([`Role::from_claim`]): unknown or missing values fall
/// back to [`Role::User`], the least privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular account that browses and rates stores.
    #[default]
    User,
    /// Manages users and stores.
    Admin,
    /// Owns a store and views its ratings.
    StoreOwner,
}

impl Role {
    /// All roles, in the order they are offered in forms.
    pub const ALL: [Self; 3] = [Self::User, Self::Admin, Self::StoreOwner];

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::StoreOwner => "STORE_OWNER",
        }
    }

    /// Human-readable label for forms and tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "Normal User",
            Self::Admin => "Admin",
            Self::StoreOwner => "Store Owner",
        }
    }

    /// Decode a role claim returned by the API.
    ///
    /// Unknown or missing values map to [`Role::User`].
    #[must_use]
    pub fn from_claim(claim: Option<&str>) -> Self {
        claim.and_then(|c| c.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "STORE_OWNER" => Ok(Self::StoreOwner),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let claim = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_claim(claim.as_deref()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("STORE_OWNER".parse::<Role>().unwrap(), Role::StoreOwner);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_claim_falls_back_to_user() {
        assert_eq!(Role::from_claim(Some("unknown-value")), Role::User);
        assert_eq!(Role::from_claim(None), Role::User);
        assert_eq!(Role::from_claim(Some("ADMIN")), Role::Admin);
    }

    #[test]
    fn test_deserialize_is_lenient() {
        let role: Role = serde_json::from_str("\"SUPER_USER\"").unwrap();
        assert_eq!(role, Role::User);
        let role: Role = serde_json::from_str("null").unwrap();
        assert_eq!(role, Role::User);
        let role: Role = serde_json::from_str("\"STORE_OWNER\"").unwrap();
        assert_eq!(role, Role::StoreOwner);
    }

    #[test]
    fn test_serialize_wire_name() {
        assert_eq!(
            serde_json::to_string(&Role::StoreOwner).unwrap(),
            "\"STORE_OWNER\""
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        for role in Role::ALL {
            assert_eq!(role.to_string(), role.as_str());
        }
    }
}
