use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::dadata::{CompanyRegistry, DadataClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::credentials::{TokenSigner, generate_secret};
use crate::services::{
    AuthService, CompanyLookupService, ContractService, SeaOrmAuthService, SeaOrmContractService,
    SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub contract_service: Arc<dyn ContractService>,

    pub company_lookup: CompanyLookupService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        if config.registry.api_key.is_empty() {
            warn!("No company registry API key configured; lookups will return nothing");
        }
        let registry = Arc::new(DadataClient::new(&config.registry)?);
        Self::with_registry(config, registry).await
    }

    /// Builds the state around a caller-supplied company registry.
    pub async fn with_registry(
        config: Config,
        registry: Arc<dyn CompanyRegistry>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let secret = if config.auth.secret_key.is_empty() {
            warn!(
                "No signing secret configured; generated a per-process key, tokens will not survive a restart"
            );
            generate_secret()
        } else {
            config.auth.secret_key.clone()
        };
        let signer = TokenSigner::new(
            secret.as_bytes(),
            chrono::Duration::minutes(i64::from(config.auth.token_ttl_minutes)),
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), signer))
            as Arc<dyn AuthService>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService>;

        let contract_service = Arc::new(SeaOrmContractService::new(store.clone()))
            as Arc<dyn ContractService>;

        let company_lookup = CompanyLookupService::new(registry);

        let created = user_service
            .ensure_admin(&config.auth.admin_username, &config.auth.admin_password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bootstrap admin account: {e}"))?;
        if created {
            info!(
                username = %config.auth.admin_username,
                "Bootstrap admin created; change its password"
            );
        }

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            contract_service,
            company_lookup,
        })
    }
}
