//! Application wiring: one gateway, one notifier, boards on demand.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::board::Board;
use crate::config::{load_config, validate_config, Config};
use crate::db::Database;
use crate::error::{ConfigError, Result};
use crate::gateway::{DocumentStore, LocalCache, PersistenceGateway, SqliteStore};
use crate::notify::{GatewayNotifier, NotificationInbox, NotificationSink};
use crate::record::{Lead, Redemption};
use crate::reminder::ReconcileReport;

pub struct App {
    config: Config,
    gateway: PersistenceGateway,
    notifier: Arc<dyn NotificationSink>,
}

impl App {
    /// Validates `config` and opens the store and cache files it names.
    pub fn open(config: Config) -> Result<Self> {
        validate_config(&config)?;
        let store_path = config
            .database
            .resolved_store_path()
            .ok_or_else(|| no_home("database.store_path"))?;
        let cache_path = config
            .database
            .resolved_cache_path()
            .ok_or_else(|| no_home("database.cache_path"))?;

        let defaults = config.collection_defaults();
        let store = SqliteStore::new(Database::open(&store_path)?, defaults.clone());
        let cache = LocalCache::open(&cache_path, defaults)?;

        log::info!(
            "Opened store {} with cache {}",
            store_path.display(),
            cache_path.display()
        );
        Ok(Self::with_store(config, Arc::new(store), cache))
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(load_config(path)?)
    }

    /// Wires the app over an existing store and cache.
    pub fn with_store(config: Config, remote: Arc<dyn DocumentStore>, cache: LocalCache) -> Self {
        let gateway = PersistenceGateway::new(remote, cache);
        let notifier: Arc<dyn NotificationSink> = Arc::new(GatewayNotifier::new(gateway.clone()));
        Self {
            config,
            gateway,
            notifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// The leads board. When reminders are enabled, leads due on `today`
    /// are moved to the reminder status as part of the load.
    pub async fn leads(&self, today: NaiveDate) -> Result<(Board<Lead>, ReconcileReport)> {
        let reminders = &self.config.reminders;
        if !reminders.enabled {
            let board = Board::load(
                self.gateway.clone(),
                self.notifier.clone(),
                self.config.edit_rules(),
            )
            .await?
            .with_lead_days(reminders.lead_days);
            return Ok((board, ReconcileReport::default()));
        }
        Board::load_with_reminders(
            self.gateway.clone(),
            self.notifier.clone(),
            self.config.edit_rules(),
            today,
            reminders.lead_days,
        )
        .await
    }

    pub async fn redemptions(&self) -> Result<Board<Redemption>> {
        Board::load(
            self.gateway.clone(),
            self.notifier.clone(),
            self.config.edit_rules(),
        )
        .await
    }

    pub fn inbox(&self) -> NotificationInbox {
        NotificationInbox::new(self.gateway.clone())
    }
}

fn no_home(key: &str) -> ConfigError {
    ConfigError::Validation {
        message: format!("{} is not set and no home directory was found", key),
    }
}
