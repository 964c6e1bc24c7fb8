//! Configuration management

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{Result, WishBotError};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dispatch: DispatchConfig,
    pub store: StoreConfig,
    pub transport: TransportConfig,
}

/// Dispatch loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Poll interval driving the scheduler.
    pub interval_seconds: u64,
    /// IANA name of the fixed reference timezone all due-date decisions and
    /// send times are evaluated in.
    pub reference_timezone: String,
}

impl DispatchConfig {
    /// Parse the configured reference timezone.
    ///
    /// # Errors
    /// Returns `WishBotError::Config` when the name is not a known IANA zone.
    pub fn timezone(&self) -> Result<Tz> {
        self.reference_timezone.parse().map_err(|_| {
            WishBotError::Config(format!("Unknown reference timezone: {}", self.reference_timezone))
        })
    }
}

/// Persisted document locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Contact directory snapshot written by the external fetcher.
    pub contacts_path: String,
    /// Calendar event snapshot written by the external fetcher.
    pub events_path: String,
    /// Dispatch ledger document (event id -> sent-at instant).
    pub ledger_path: String,
    /// Error handler binding document (category -> handler tag).
    pub error_handlers_path: String,
    /// OAuth token file the external fetcher maintains; only its presence is
    /// checked here.
    pub token_path: String,
}

/// Wish gateway transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the message gateway.
    pub gateway_url: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            store: StoreConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            interval_seconds: constants::DEFAULT_POLL_INTERVAL_SECS,
            reference_timezone: constants::DEFAULT_REFERENCE_TIMEZONE.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            contacts_path: constants::CONTACTS_FILE.to_string(),
            events_path: constants::EVENTS_FILE.to_string(),
            ledger_path: constants::LEDGER_FILE.to_string(),
            error_handlers_path: constants::ERROR_HANDLERS_FILE.to_string(),
            token_path: constants::TOKEN_FILE.to_string(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { gateway_url: "http://localhost:8787".to_string(), access_token: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timezone_parses() {
        let config = Config::default();
        let tz = config.dispatch.timezone().unwrap();
        assert_eq!(tz, chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let dispatch = DispatchConfig {
            interval_seconds: 60,
            reference_timezone: "Mars/Olympus_Mons".to_string(),
        };
        let err = dispatch.timezone().unwrap_err();
        assert!(matches!(err, WishBotError::Config(_)));
    }

    #[test]
    fn access_token_is_never_serialized() {
        let config = Config {
            transport: TransportConfig {
                gateway_url: "https://gateway.example".to_string(),
                access_token: Some("secret".to_string()),
            },
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
