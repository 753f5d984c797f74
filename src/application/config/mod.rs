pub mod database;
pub mod invites;
pub mod server;
pub mod storage;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub storage: storage::StorageConfig,
    pub invites: invites::InvitesConfig,

    // Build info
    pub commit_hash: String,
    pub version: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        // A missing .env file is the normal case in production
        let _ = dotenvy::dotenv();

        let invites = invites::InvitesConfig::from_env();
        let storage = storage::StorageConfig::from_env(&invites.public_base_url);

        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            storage,
            invites,

            commit_hash: env::var("COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            log_level: env::var("INVITE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
