//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::User;
use crate::db::repositories::user::{hash_password_blocking, verify_password};
use crate::domain::{ContractStatus, Principal, Role};
use crate::services::policy;
use crate::services::status_sync;
use crate::services::user_service::{
    NewUser, PasswordChange, UserError, UserService, UserUpdate, UserWithStats,
};
use crate::services::validation;

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn parse_role(raw: Option<&str>) -> Result<Role, UserError> {
        match raw {
            None => Ok(Role::default()),
            Some(raw) => Role::parse(raw).ok_or_else(|| UserError::InvalidRole(raw.to_string())),
        }
    }

    async fn find(&self, id: i32) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, UserError> {
        validation::username(&new_user.username).map_err(UserError::Validation)?;
        validation::password(&new_user.password).map_err(UserError::Validation)?;
        let role = Self::parse_role(new_user.role.as_deref())?;

        if self
            .store
            .get_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername(new_user.username));
        }

        let hash = hash_password_blocking(&new_user.password, &self.security).await?;
        let user = self
            .store
            .create_user(&new_user.username, &hash, role)
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(
        &self,
        caller: &Principal,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<User>, UserError> {
        policy::require_admin(caller)?;
        Ok(self.store.list_users(skip, limit).await?)
    }

    async fn get(&self, caller: &Principal, id: i32) -> Result<User, UserError> {
        policy::self_or_admin(caller, id)?;
        self.find(id).await
    }

    async fn get_with_stats(
        &self,
        caller: &Principal,
        id: i32,
    ) -> Result<UserWithStats, UserError> {
        policy::self_or_admin(caller, id)?;
        let user = self.find(id).await?;

        let records = self.store.list_contracts(Some(id)).await?;
        let views = status_sync::observe(&self.store, records, Utc::now()).await?;

        let count = |status: ContractStatus| views.iter().filter(|v| v.status() == status).count();

        Ok(UserWithStats {
            user,
            total_contracts: views.len(),
            active_contracts: count(ContractStatus::Active),
            expiring_contracts: count(ContractStatus::ExpiringSoon),
            expired_contracts: count(ContractStatus::Expired),
        })
    }

    async fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        self.insert(new_user).await
    }

    async fn create(&self, caller: &Principal, new_user: NewUser) -> Result<User, UserError> {
        policy::require_admin(caller)?;
        self.insert(new_user).await
    }

    async fn update(
        &self,
        caller: &Principal,
        id: i32,
        update: UserUpdate,
    ) -> Result<User, UserError> {
        policy::self_or_admin(caller, id)?;

        let role = match update.role.as_deref() {
            Some(raw) => Some(Self::parse_role(Some(raw))?),
            None => None,
        };
        if let Some(username) = &update.username {
            validation::username(username).map_err(UserError::Validation)?;
        }

        let current = self.find(id).await?;

        if let Some(role) = role
            && role != current.role
            && !caller.is_admin()
        {
            return Err(UserError::Forbidden(
                "Only administrators can change roles".to_string(),
            ));
        }

        if let Some(username) = &update.username
            && *username != current.username
            && self.store.get_user_by_username(username).await?.is_some()
        {
            return Err(UserError::DuplicateUsername(username.clone()));
        }

        let user = self
            .store
            .update_user(id, update.username.as_deref(), role)
            .await?
            .ok_or(UserError::NotFound(id))?;

        info!(user_id = id, by = caller.id, "User updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        caller: &Principal,
        id: i32,
        change: PasswordChange,
    ) -> Result<(), UserError> {
        policy::self_or_admin(caller, id)?;
        validation::password(&change.new_password).map_err(UserError::Validation)?;

        let stored_hash = self
            .store
            .get_password_hash(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if caller.id == id {
            let current = change
                .current_password
                .as_deref()
                .ok_or(UserError::IncorrectPassword)?;
            if !verify_password(&stored_hash, current).await? {
                return Err(UserError::IncorrectPassword);
            }
        }

        let hash = hash_password_blocking(&change.new_password, &self.security).await?;
        if !self.store.update_password_hash(id, &hash).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, by = caller.id, "Password changed");
        Ok(())
    }

    async fn delete(&self, caller: &Principal, id: i32) -> Result<(), UserError> {
        policy::require_admin(caller)?;

        if !self.store.delete_user(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, by = caller.id, "User deleted with owned contracts");
        Ok(())
    }

    async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, UserError> {
        if self.store.get_user_by_username(username).await?.is_some() {
            info!(username, "Admin account already present");
            return Ok(false);
        }

        let hash = hash_password_blocking(password, &self.security).await?;
        let user = self.store.create_user(username, &hash, Role::Admin).await?;

        info!(user_id = user.id, username, "Created bootstrap admin account");
        Ok(true)
    }
}
