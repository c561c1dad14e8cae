//! Domain service for the user directory.
//!
//! Account CRUD, password changes, and per-user contract statistics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;
use crate::domain::Principal;
use crate::services::policy::Forbidden;

/// Errors specific to user directory operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with ID {0} not found")]
    NotFound(i32),

    #[error("User with username {0} already exists")]
    DuplicateUsername(String),

    #[error("Role must be one of: admin, lawyer (got {0})")]
    InvalidRole(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Incorrect current password")]
    IncorrectPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<Forbidden> for UserError {
    fn from(err: Forbidden) -> Self {
        Self::Forbidden(err.0.to_string())
    }
}

/// A user plus counts of their contracts by derived status.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: User,
    pub total_contracts: usize,
    pub active_contracts: usize,
    pub expiring_contracts: usize,
    pub expired_contracts: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    /// Defaults to `lawyer`
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    /// Required when changing your own password
    #[serde(default)]
    pub current_password: Option<String>,
    pub new_password: String,
}

/// Domain service trait for user management.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Admin only.
    async fn list(
        &self,
        caller: &Principal,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<User>, UserError>;

    async fn get(&self, caller: &Principal, id: i32) -> Result<User, UserError>;

    /// Counts are taken from the user's contracts at call time, after stale
    /// statuses have been corrected.
    async fn get_with_stats(
        &self,
        caller: &Principal,
        id: i32,
    ) -> Result<UserWithStats, UserError>;

    /// Public self-registration; the role defaults to `lawyer`.
    async fn register(&self, new_user: NewUser) -> Result<User, UserError>;

    /// Admin only.
    async fn create(&self, caller: &Principal, new_user: NewUser) -> Result<User, UserError>;

    /// Users may rename themselves; only admins may change roles.
    async fn update(
        &self,
        caller: &Principal,
        id: i32,
        update: UserUpdate,
    ) -> Result<User, UserError>;

    /// Changing your own password requires the current one. Admins changing
    /// someone else's password are not asked for it.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::IncorrectPassword`] if verification fails; the
    /// stored hash is left untouched.
    async fn change_password(
        &self,
        caller: &Principal,
        id: i32,
        change: PasswordChange,
    ) -> Result<(), UserError>;

    /// Admin only. Deletes every contract the user owns as well.
    async fn delete(&self, caller: &Principal, id: i32) -> Result<(), UserError>;

    /// Creates the bootstrap admin account unless the username is taken.
    /// Returns whether an account was created.
    async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, UserError>;
}
