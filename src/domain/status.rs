//! Contract lifecycle status, derived from the expiry date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contracts expiring within this many whole days are `expiring_soon`.
pub const EXPIRING_SOON_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    ExpiringSoon,
    Expired,
}

impl ContractStatus {
    pub const ALLOWED: [&'static str; 3] = ["active", "expiring_soon", "expired"];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "expiring_soon" => Some(Self::ExpiringSoon),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status plus the number of whole days left, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub status: ContractStatus,
    /// Never negative: expired contracts report 0.
    pub days_left: i64,
}

/// Derives the lifecycle status of a contract ending at `end_date`.
///
/// `days_left` is the floor of the remaining time in days, so a contract
/// ending in 30 days and 23 hours is still `expiring_soon`, and one that
/// ended a second ago is `expired`.
#[must_use]
pub fn derive_status(end_date: DateTime<Utc>, now: DateTime<Utc>) -> StatusInfo {
    if end_date < now {
        return StatusInfo {
            status: ContractStatus::Expired,
            days_left: 0,
        };
    }

    // Non-negative here, so integer division is the floor.
    let days_left = (end_date - now).num_seconds() / SECONDS_PER_DAY;

    let status = if days_left <= EXPIRING_SOON_DAYS {
        ContractStatus::ExpiringSoon
    } else {
        ContractStatus::Active
    };

    StatusInfo { status, days_left }
}
