pub mod loader;
pub mod schema;

pub use loader::{
    load_config, load_config_from_str, load_config_from_str_as, validate_config, ConfigFormat,
};
pub use schema::{CollectionConfig, Config, DatabaseConfig, LoggingConfig, ReminderConfig};
