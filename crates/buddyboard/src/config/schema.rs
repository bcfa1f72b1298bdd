use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classifier::DEFAULT_REMINDER_LEAD_DAYS;
use crate::db;
use crate::gateway::CollectionDefaults;
use crate::record::EditRules;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default = "default_collections")]
    pub collections: Vec<CollectionConfig>,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default = "default_handlers")]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_handlers() -> Vec<String> {
    vec!["Victoria".to_string(), "Waiyee".to_string()]
}

fn default_collections() -> Vec<CollectionConfig> {
    vec![
        CollectionConfig::new("leads", Some("Pending Service")),
        CollectionConfig::new("redemptions", Some("To Redeem")),
        CollectionConfig::new("notifications", None),
        CollectionConfig::new("users", None),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            database: DatabaseConfig::default(),
            collections: default_collections(),
            reminders: ReminderConfig::default(),
            handlers: default_handlers(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Default statuses of every configured collection.
    pub fn collection_defaults(&self) -> CollectionDefaults {
        self.collections
            .iter()
            .fold(CollectionDefaults::default(), |defaults, c| {
                match &c.default_status {
                    Some(status) => defaults.with_status(&c.name, status),
                    None => defaults,
                }
            })
    }

    pub fn edit_rules(&self) -> EditRules {
        EditRules::with_handlers(&self.handlers)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Document store file. Defaults to `~/.buddyboard/data/store.db`.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Local cache file. Defaults to `~/.buddyboard/data/cache.db`.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(db::default_store_path)
    }

    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        self.cache_path.clone().or_else(db::default_cache_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    #[serde(default)]
    pub default_status: Option<String>,
}

impl CollectionConfig {
    pub fn new(name: &str, default_status: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            default_status: default_status.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Days before the service start at which a reminder is due.
    #[serde(default = "default_lead_days")]
    pub lead_days: i64,
}

fn default_lead_days() -> i64 {
    DEFAULT_REMINDER_LEAD_DAYS
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_days: DEFAULT_REMINDER_LEAD_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
