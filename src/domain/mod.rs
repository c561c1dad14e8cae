//! Domain types for contract management with strong typing.
//!
//! This module holds the pure vocabulary of the system: roles, the
//! authenticated principal, contract lifecycle status and the audit history
//! format. Nothing in here touches the database or the network.

pub mod history;
pub mod status;
pub mod timestamp;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use history::{ChangeSet, FieldChange, HistoryAction, HistoryEntry};
pub use status::{ContractStatus, StatusInfo, derive_status};

/// Access role of a user account.
///
/// # Examples
///
/// ```rust
/// use contractdesk::domain::Role;
///
/// assert_eq!(Role::parse("admin"), Some(Role::Admin));
/// assert_eq!(Role::parse("Admin"), None);
/// assert_eq!(Role::Lawyer.as_str(), "lawyer");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Lawyer,
}

impl Role {
    pub const ALLOWED: [&'static str; 2] = ["admin", "lawyer"];

    /// Parses the stored/wire representation. Matching is case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "lawyer" => Some(Self::Lawyer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lawyer => "lawyer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity attached to a request.
///
/// Always built from the *current* user record, so a role change takes
/// effect on the next request even if the caller still holds an old token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_string_form() {
        for name in Role::ALLOWED {
            let role = Role::parse(name).unwrap();
            assert_eq!(role.as_str(), name);
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::default(), Role::Lawyer);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let parsed: Role = serde_json::from_str("\"lawyer\"").unwrap();
        assert_eq!(parsed, Role::Lawyer);
    }

    #[test]
    fn principal_admin_check() {
        let admin = Principal {
            id: 1,
            username: "root".to_string(),
            role: Role::Admin,
        };
        let lawyer = Principal {
            role: Role::Lawyer,
            ..admin.clone()
        };
        assert!(admin.is_admin());
        assert!(!lawyer.is_admin());
    }
}
