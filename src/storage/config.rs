use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::calendar::attendees::{default_domain_labels, AttendeeValidator, MAX_ATTENDEES};
use crate::calendar::draft::MAX_YEAR;
use crate::calendar::query::DEFAULT_WINDOW_YEARS;

pub const APP_DIR: &str = "gcal-events";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub google: GoogleConfig,
    pub rules: RulesConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    pub base_url: String,
    pub calendar_id: String,
    pub access_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulesConfig {
    pub required_domain_labels: Vec<String>,
    pub max_attendees: usize,
    pub max_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryConfig {
    pub window_years: u32,
    pub upcoming_count: u32,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn attendee_validator(&self) -> AttendeeValidator {
        AttendeeValidator::new(
            self.rules.required_domain_labels.clone(),
            self.rules.max_attendees,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google: GoogleConfig {
                base_url: "https://www.googleapis.com/calendar/v3".to_string(),
                calendar_id: "primary".to_string(),
                access_token_env: "GCAL_ACCESS_TOKEN".to_string(),
            },
            rules: RulesConfig {
                required_domain_labels: default_domain_labels(),
                max_attendees: MAX_ATTENDEES,
                max_year: MAX_YEAR,
            },
            query: QueryConfig {
                window_years: DEFAULT_WINDOW_YEARS,
                upcoming_count: 10,
            },
        }
    }
}
