use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{ContractStatus, Role};

pub mod migrator;
pub mod repositories;

pub use repositories::contract::{ContractRecord, NewContract};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would open its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        if !in_memory {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn contract_repo(&self) -> repositories::contract::ContractRepository {
        repositories::contract::ContractRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_with_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn get_password_hash(&self, id: i32) -> Result<Option<String>> {
        self.user_repo().get_password_hash(id).await
    }

    pub async fn list_users(&self, skip: u64, limit: u64) -> Result<Vec<User>> {
        self.user_repo().list(skip, limit).await
    }

    pub async fn list_all_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn user_exists(&self, id: i32) -> Result<bool> {
        self.user_repo().exists(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<User> {
        self.user_repo().create(username, password_hash, role).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        username: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<User>> {
        self.user_repo().update(id, username, role).await
    }

    pub async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<bool> {
        self.user_repo().update_password_hash(id, password_hash).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete_with_contracts(id).await
    }

    // ========== Contract Repository Methods ==========

    pub async fn get_contract(&self, id: i32) -> Result<Option<ContractRecord>> {
        self.contract_repo().get(id).await
    }

    pub async fn get_contract_by_inn(&self, inn: &str) -> Result<Option<ContractRecord>> {
        self.contract_repo().get_by_inn(inn).await
    }

    pub async fn list_contracts(&self, owner: Option<i32>) -> Result<Vec<ContractRecord>> {
        self.contract_repo().list(owner).await
    }

    pub async fn insert_contract(&self, contract: NewContract) -> Result<ContractRecord> {
        self.contract_repo().insert(contract).await
    }

    pub async fn save_contract(&self, contract: &ContractRecord) -> Result<()> {
        self.contract_repo().save(contract).await
    }

    pub async fn set_contract_status(&self, ids: &[i32], status: ContractStatus) -> Result<u64> {
        self.contract_repo().set_status(ids, status).await
    }

    pub async fn delete_contract(&self, id: i32) -> Result<bool> {
        self.contract_repo().delete(id).await
    }
}
