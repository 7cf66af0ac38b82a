//! Role router.
//!
//! Maps an authenticated account's role to the dashboard it lands on. The
//! mapping is total: unknown or missing role claims land on the user
//! dashboard.

use core::fmt;

use crate::types::Role;

/// One of the three dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dashboard {
    Admin,
    User,
    StoreOwner,
}

impl Dashboard {
    /// Path the dashboard is served at.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::User => "/user",
            Self::StoreOwner => "/stores",
        }
    }

    /// Page title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Admin => "Admin Dashboard",
            Self::User => "User Dashboard",
            Self::StoreOwner => "Store Owner Dashboard",
        }
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Dashboard for an account with `role`.
#[must_use]
pub const fn route_for_role(role: Role) -> Dashboard {
    match role {
        Role::Admin => Dashboard::Admin,
        Role::StoreOwner => Dashboard::StoreOwner,
        Role::User => Dashboard::User,
    }
}

/// Dashboard for a raw role claim as returned by the login endpoint.
#[must_use]
pub fn route_for_claim(claim: Option<&str>) -> Dashboard {
    route_for_role(Role::from_claim(claim))
}
