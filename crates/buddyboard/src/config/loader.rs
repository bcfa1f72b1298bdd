use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::record::{Lead, LeadStatus, Record, Redemption, RedemptionStatus};

/// Source format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Picks the format from a file extension. Files without one are JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(ConfigFormat::Json),
            Some(ext) => match ext.to_ascii_lowercase().as_str() {
                "json" => Ok(ConfigFormat::Json),
                "yaml" | "yml" => Ok(ConfigFormat::Yaml),
                other => Err(ConfigError::UnsupportedFormat(other.to_string())),
            },
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = load_config_from_str_as(&content, format)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parses a JSON config document.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    load_config_from_str_as(content, ConfigFormat::Json)
}

pub fn load_config_from_str_as(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let config: Config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// Defaults are stored verbatim, so they must match a status exactly.
fn is_lead_status(value: &str) -> bool {
    LeadStatus::ALL.iter().any(|s| s.as_str() == value)
}

fn is_redemption_status(value: &str) -> bool {
    RedemptionStatus::ALL.iter().any(|s| s.as_str() == value)
}

/// Collections whose records decode only with a known status.
const STATUS_COLLECTIONS: [(&str, fn(&str) -> bool); 2] = [
    (Lead::COLLECTION, is_lead_status),
    (Redemption::COLLECTION, is_redemption_status),
];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let mut names = HashSet::new();
    for collection in &config.collections {
        if !is_valid_collection_name(&collection.name) {
            return Err(invalid(format!(
                "Invalid collection name '{}': use letters, digits, '_' or '-'",
                collection.name
            )));
        }
        if !names.insert(collection.name.as_str()) {
            return Err(invalid(format!(
                "Duplicate collection '{}'",
                collection.name
            )));
        }
        if let Some(status) = &collection.default_status {
            if status.trim().is_empty() {
                return Err(invalid(format!(
                    "Collection '{}' has an empty default status",
                    collection.name
                )));
            }
        }
    }

    for (name, is_known) in STATUS_COLLECTIONS {
        let collection = config
            .collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| invalid(format!("Collection '{}' must be configured", name)))?;
        match collection.default_status.as_deref() {
            Some(status) if is_known(status) => {}
            Some(status) => {
                return Err(invalid(format!(
                    "Collection '{}' has an unknown default status '{}'",
                    name, status
                )))
            }
            None => {
                return Err(invalid(format!(
                    "Collection '{}' needs a default status",
                    name
                )))
            }
        }
    }

    if config.reminders.lead_days < 1 {
        return Err(invalid(format!(
            "reminders.lead_days must be at least 1, got {}",
            config.reminders.lead_days
        )));
    }

    let mut handlers = HashSet::new();
    for handler in &config.handlers {
        if handler.trim().is_empty() {
            return Err(invalid("Handler names must not be empty"));
        }
        if !handlers.insert(handler.as_str()) {
            return Err(invalid(format!("Duplicate handler '{}'", handler)));
        }
    }

    if config.logging.level.trim().is_empty() {
        return Err(invalid("logging.level must not be empty"));
    }

    Ok(())
}
