use std::sync::Arc;

use infra::store::{BracketStore, PgBracketStore};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::domains::teams::{PgStatisticsProvider, StatisticsProvider};
use crate::services::{LogNotifier, Notifier, WebhookNotifier};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    config: Arc<AppConfig>,
    store: Arc<dyn BracketStore>,
    notifier: Arc<dyn Notifier>,
    stats: Arc<dyn StatisticsProvider>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };

        Self {
            store: Arc::new(PgBracketStore::new(db.clone())),
            stats: Arc::new(PgStatisticsProvider::new(db.clone())),
            config: Arc::new(config),
            notifier,
            db,
        }
    }

    /// Assemble state from explicit collaborators.
    pub fn with_parts(
        db: PgPool,
        config: AppConfig,
        store: Arc<dyn BracketStore>,
        notifier: Arc<dyn Notifier>,
        stats: Arc<dyn StatisticsProvider>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            store,
            notifier,
            stats,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn BracketStore {
        self.store.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn stats(&self) -> &dyn StatisticsProvider {
        self.stats.as_ref()
    }
}
