pub mod analytics;
pub mod app;
pub mod board;
pub mod calendar;
pub mod classifier;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod notify;
pub mod record;
pub mod reminder;
pub mod table;

pub use app::App;
pub use board::Board;
pub use classifier::{Bucket, Classifiable, Stage};
pub use config::{load_config, Config};
pub use error::{BuddyboardError, ConfigError, LoggingError, Result, ValidationError};
pub use gateway::{DocumentStore, GatewayError, LocalCache, PersistenceGateway, SqliteStore};
pub use logging::init_logging;
pub use notify::{GatewayNotifier, NotificationInbox, NotificationSink};
pub use record::{Lead, LeadStatus, NewLead, NewRedemption, Notification, Redemption, RedemptionStatus};
pub use table::{SortDirection, TableState};
