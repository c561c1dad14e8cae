//! Account provisioning commands

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::hash_password_blocking;
use crate::services::{NewUser, SeaOrmUserService, UserService};

pub async fn cmd_create_user(
    config: &Config,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_url).await?;
    let service = SeaOrmUserService::new(store, config.security.clone());

    let user = service
        .register(NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role: Some(role.to_string()),
        })
        .await?;

    println!("✓ Created {} '{}' (ID: {})", user.role, user.username, user.id);
    Ok(())
}

pub async fn cmd_hash_password(config: &Config, password: &str) -> anyhow::Result<()> {
    let hash = hash_password_blocking(password, &config.security).await?;
    println!("{hash}");
    Ok(())
}
