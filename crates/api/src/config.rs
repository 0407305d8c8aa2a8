use anyhow::{Context, Result};
use std::env;

use crate::domains::teams::ModeTable;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub skip_migrations: bool,
    pub notify_webhook_url: Option<String>,
    pub default_mode_id: i32,
    pub modes: ModeTable,
    pub seed_grouping_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let modes = match env::var("MODE_TABLE") {
            Ok(raw) if !raw.trim().is_empty() => {
                ModeTable::from_json(&raw).context("MODE_TABLE is not a valid mode list")?
            }
            _ => ModeTable::default(),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            skip_migrations: env::var("SKIP_MIGRATIONS")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            default_mode_id: env::var("DEFAULT_MODE_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            modes,
            seed_grouping_size: env::var("SEED_GROUPING_SIZE")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
        })
    }

    /// Defaults for everything except the database location.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: 30,
            port: 8080,
            skip_migrations: false,
            notify_webhook_url: None,
            default_mode_id: 1,
            modes: ModeTable::default(),
            seed_grouping_size: 4,
        }
    }
}
