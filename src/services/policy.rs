//! Role and ownership gates consulted before restricted reads and mutations.

use thiserror::Error;

use crate::domain::Principal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Forbidden(pub &'static str);

/// Passes only for admins.
pub const fn require_admin(principal: &Principal) -> Result<(), Forbidden> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(Forbidden("Admin privileges required"))
    }
}

/// Passes when the caller is `target_id` or an admin.
pub const fn self_or_admin(principal: &Principal, target_id: i32) -> Result<(), Forbidden> {
    if principal.id == target_id || principal.is_admin() {
        Ok(())
    } else {
        Err(Forbidden("Not allowed to access another user's account"))
    }
}

/// Passes when the caller owns the resource or is an admin.
pub const fn owner_or_admin(principal: &Principal, owner_id: i32) -> Result<(), Forbidden> {
    if principal.id == owner_id || principal.is_admin() {
        Ok(())
    } else {
        Err(Forbidden("Not allowed to access this contract"))
    }
}

/// Owner scope for listing and stats.
///
/// Admins get exactly what they asked for (`None` = everyone). Everyone else
/// is scoped to themselves, whatever `requested` says.
#[must_use]
pub const fn visible_owner(principal: &Principal, requested: Option<i32>) -> Option<i32> {
    if principal.is_admin() {
        requested
    } else {
        Some(principal.id)
    }
}
