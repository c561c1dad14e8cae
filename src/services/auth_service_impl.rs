//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::db::repositories::user::verify_password;
use crate::domain::Principal;
use crate::services::auth_service::{AuthError, AuthService, TokenGrant};
use crate::services::credentials::TokenSigner;
use async_trait::async_trait;
use tracing::debug;

pub struct SeaOrmAuthService {
    store: Store,
    signer: TokenSigner,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, signer: TokenSigner) -> Self {
        Self { store, signer }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let Some((user, password_hash)) = self.store.get_user_with_password_hash(username).await?
        else {
            debug!(username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&password_hash, password).await? {
            debug!(username, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.principal())
    }

    fn issue_token(&self, principal: &Principal) -> Result<TokenGrant, AuthError> {
        let token = self.signer.issue(&principal.username)?;
        Ok(TokenGrant::bearer(token))
    }

    async fn resolve_token(&self, token: &str) -> Result<Principal, AuthError> {
        let username = self.signer.verify(token)?;

        let user = self
            .store
            .get_user_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(user.principal())
    }
}
