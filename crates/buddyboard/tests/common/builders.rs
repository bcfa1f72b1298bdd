//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};

use buddyboard::config::{Config, LoggingConfig, ReminderConfig};
use buddyboard::record::{NewLead, NewRedemption};

/// The fixed "today" every scenario runs against.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

/// `today + days` as a stored date string.
pub fn day(days: i64) -> String {
    (today() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Builder for `NewLead` drafts. Starts out valid.
pub struct LeadBuilder {
    draft: NewLead,
}

impl LeadBuilder {
    pub fn new(customer: &str) -> Self {
        Self {
            draft: NewLead {
                customer_name: customer.to_string(),
                customer_contact: "555-123-4567".to_string(),
                customer_address: None,
                service_provider_name: "Best Pet Care".to_string(),
                service_provider_contact: "555-987-6543".to_string(),
                service_start_date: day(10),
                service_end_date: day(11),
                service_start_time: "09:00".to_string(),
                service_end_time: "17:00".to_string(),
                notes: String::new(),
                total_price: 100.0,
                handled_by: None,
            },
        }
    }

    /// Service window starting `start` days and ending `end` days from today.
    pub fn window(mut self, start: i64, end: i64) -> Self {
        self.draft.service_start_date = day(start);
        self.draft.service_end_date = day(end);
        self
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.draft.service_provider_name = provider.to_string();
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.draft.total_price = price;
        self
    }

    pub fn handled_by(mut self, handler: &str) -> Self {
        self.draft.handled_by = Some(handler.to_string());
        self
    }

    pub fn build(self) -> NewLead {
        self.draft
    }
}

/// Builder for `NewRedemption` drafts. Starts out valid.
pub struct RedemptionBuilder {
    draft: NewRedemption,
}

impl RedemptionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            draft: NewRedemption {
                month: "October".to_string(),
                date_from: day(-18),
                date_to: day(12),
                name: name.to_string(),
                perks: "Free dessert".to_string(),
                ..NewRedemption::default()
            },
        }
    }

    pub fn window(mut self, from: i64, to: i64) -> Self {
        self.draft.date_from = day(from);
        self.draft.date_to = day(to);
        self
    }

    pub fn build(self) -> NewRedemption {
        self.draft
    }
}

/// Builder for `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn reminders(mut self, enabled: bool, lead_days: i64) -> Self {
        self.config.reminders = ReminderConfig { enabled, lead_days };
        self
    }

    pub fn handlers(mut self, handlers: &[&str]) -> Self {
        self.config.handlers = handlers.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn logging(mut self, level: &str, json: bool) -> Self {
        self.config.logging = LoggingConfig {
            level: level.to_string(),
            json,
        };
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
