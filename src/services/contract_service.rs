//! Domain service for the contract ledger.
//!
//! Contract CRUD with derived lifecycle status, an append-only change history,
//! and ownership-scoped visibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::db::ContractRecord;
use crate::domain::{ContractStatus, Principal, StatusInfo, timestamp};
use crate::services::policy::Forbidden;

/// Errors specific to contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Contract with ID {0} not found")]
    NotFound(i32),

    #[error("Lawyer with ID {0} not found")]
    LawyerNotFound(i32),

    #[error("Contract with INN {0} already exists")]
    DuplicateTaxId(String),

    #[error("Status must be one of: active, expiring_soon, expired (got {0})")]
    InvalidStatus(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ContractError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ContractError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<Forbidden> for ContractError {
    fn from(err: Forbidden) -> Self {
        Self::Forbidden(err.0.to_string())
    }
}

/// A contract as returned to callers: the record plus its derived status.
#[derive(Debug, Clone, Serialize)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: ContractRecord,
    pub status: ContractStatus,
    pub days_left: i64,
}

impl ContractView {
    #[must_use]
    pub fn new(mut contract: ContractRecord, info: StatusInfo) -> Self {
        contract.status = Some(info.status);
        Self {
            contract,
            status: info.status,
            days_left: info.days_left,
        }
    }

    #[must_use]
    pub const fn status(&self) -> ContractStatus {
        self.status
    }
}

/// Payload for creating a contract.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractDraft {
    pub company_name: String,
    pub inn: String,
    pub director: String,
    pub address: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub has_nd: bool,
    /// Defaults to the caller. Only admins may name someone else.
    #[serde(default)]
    pub lawyer_id: Option<i32>,
}

/// Partial update. Absent fields are left untouched.
///
/// `comments` distinguishes absent (`None`) from an explicit `null`
/// (`Some(None)`), which clears the comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub end_date: Option<DateTime<Utc>>,
    /// Accepted and validated, never stored: status follows `end_date`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub comments: Option<Option<String>>,
    #[serde(default)]
    pub has_nd: Option<bool>,
    #[serde(default)]
    pub lawyer_id: Option<i32>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Listing filters.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub lawyer_id: Option<i32>,
    /// Case-insensitive substring of company name, INN, director or address
    #[serde(default)]
    pub search: Option<String>,
}

const fn default_limit() -> u64 {
    100
}

impl Default for ContractQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            status: None,
            lawyer_id: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: ContractStatus) {
        self.total += 1;
        match status {
            ContractStatus::Active => self.active += 1,
            ContractStatus::ExpiringSoon => self.expiring_soon += 1,
            ContractStatus::Expired => self.expired += 1,
        }
    }
}

impl<'a> FromIterator<&'a ContractView> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a ContractView>>(iter: I) -> Self {
        let mut counts = Self::default();
        for view in iter {
            counts.add(view.status);
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractStats {
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// Keyed by username; only for unfiltered admin requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_lawyer: Option<BTreeMap<String, StatusCounts>>,
}

/// Domain service trait for contract management.
#[async_trait::async_trait]
pub trait ContractService: Send + Sync {
    /// Lists visible contracts. A non-admin asking for another lawyer's
    /// contracts silently gets their own.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidStatus`] for an unknown status filter.
    async fn list(
        &self,
        caller: &Principal,
        query: ContractQuery,
    ) -> Result<Vec<ContractView>, ContractError>;

    async fn get(&self, caller: &Principal, id: i32) -> Result<ContractView, ContractError>;

    /// Creates a contract owned by the caller, or by `lawyer_id` for admins.
    /// The history starts with a single `create` entry.
    async fn create(
        &self,
        caller: &Principal,
        draft: ContractDraft,
    ) -> Result<ContractView, ContractError>;

    /// Applies the supplied fields that differ from the stored ones and, if
    /// any did, appends one `update` history entry. Nothing is written when
    /// a check fails.
    async fn update(
        &self,
        caller: &Principal,
        id: i32,
        patch: ContractPatch,
    ) -> Result<ContractView, ContractError>;

    /// Admin only. Hard delete.
    async fn delete(&self, caller: &Principal, id: i32) -> Result<(), ContractError>;

    async fn stats(
        &self,
        caller: &Principal,
        lawyer_id: Option<i32>,
    ) -> Result<ContractStats, ContractError>;
}
