//! Domain service for credentials.
//!
//! Verifies username/password pairs and issues and resolves access tokens.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Principal;
use crate::services::credentials::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid => Self::InvalidToken,
        }
    }
}

/// Access token as handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenGrant {
    #[must_use]
    pub const fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username or a
    /// wrong password; the two cases are indistinguishable to the caller.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;

    /// Issues an access token bound to the principal's username.
    fn issue_token(&self, principal: &Principal) -> Result<TokenGrant, AuthError>;

    /// Resolves a token to the *current* state of the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenExpired`] or [`AuthError::InvalidToken`]; the
    /// latter also when the user no longer exists.
    async fn resolve_token(&self, token: &str) -> Result<Principal, AuthError>;

    /// [`authenticate`](Self::authenticate) followed by [`issue_token`](Self::issue_token).
    async fn login(&self, username: &str, password: &str) -> Result<TokenGrant, AuthError> {
        let principal = self.authenticate(username, password).await?;
        self.issue_token(&principal)
    }
}
