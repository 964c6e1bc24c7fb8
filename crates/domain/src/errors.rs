//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for WishBot
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum WishBotError {
    /// The external fetcher's OAuth token file is absent.
    #[error("Token file not found: {0}")]
    TokenMissing(String),

    /// Credentials required for an external API call are not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The contact directory snapshot could not be loaded.
    #[error("Contact directory unavailable: {0}")]
    ContactDirectoryUnavailable(String),

    /// The calendar event snapshot could not be loaded.
    #[error("Event source unavailable: {0}")]
    EventSourceUnavailable(String),

    /// An event record is missing required fields or carries an unparseable
    /// start time.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The event's contact has no phone number (or no contact exists for the
    /// creator key at all).
    #[error("Phone number not found: {0}")]
    PhoneNumberNotFound(String),

    /// A wish was already recorded for this event id.
    #[error("Already dispatched: {0}")]
    AlreadyDispatched(String),

    /// The outbound send failed; the event stays unrecorded so a later cycle
    /// retries it.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted store read/write error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WishBotError {
    /// The registry category this error is routed under.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TokenMissing(_) => ErrorCategory::TokenMissing,
            Self::MissingCredentials(_) => ErrorCategory::MissingCredentials,
            Self::ContactDirectoryUnavailable(_) => ErrorCategory::ContactDirectoryUnavailable,
            Self::EventSourceUnavailable(_) => ErrorCategory::EventSourceUnavailable,
            Self::MalformedEvent(_) => ErrorCategory::MalformedEvent,
            Self::PhoneNumberNotFound(_) => ErrorCategory::PhoneNumberNotFound,
            Self::AlreadyDispatched(_) => ErrorCategory::AlreadyDispatched,
            Self::DeliveryFailed(_) => ErrorCategory::DeliveryFailed,
            Self::Config(_) => ErrorCategory::Config,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories used as registry lookup keys.
///
/// Every [`WishBotError`] maps to exactly one category; the persisted handler
/// bindings are keyed by the category's string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    TokenMissing,
    MissingCredentials,
    ContactDirectoryUnavailable,
    EventSourceUnavailable,
    MalformedEvent,
    PhoneNumberNotFound,
    AlreadyDispatched,
    DeliveryFailed,
    Config,
    Storage,
    Internal,
}

impl ErrorCategory {
    /// Stable string form used as the persisted binding key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenMissing => "token_missing",
            Self::MissingCredentials => "missing_credentials",
            Self::ContactDirectoryUnavailable => "contact_directory_unavailable",
            Self::EventSourceUnavailable => "event_source_unavailable",
            Self::MalformedEvent => "malformed_event",
            Self::PhoneNumberNotFound => "phone_number_not_found",
            Self::AlreadyDispatched => "already_dispatched",
            Self::DeliveryFailed => "delivery_failed",
            Self::Config => "config",
            Self::Storage => "storage",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for WishBot operations
pub type Result<T> = std::result::Result<T, WishBotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_maps_to_a_category() {
        let err = WishBotError::PhoneNumberNotFound("people/c42".into());
        assert_eq!(err.category(), ErrorCategory::PhoneNumberNotFound);
        assert_eq!(err.category().as_str(), "phone_number_not_found");
    }

    #[test]
    fn category_serializes_to_snake_case_string() {
        let json = serde_json::to_string(&ErrorCategory::DeliveryFailed).unwrap();
        assert_eq!(json, "\"delivery_failed\"");
    }

    #[test]
    fn error_serializes_with_type_tag() {
        let err = WishBotError::DeliveryFailed("gateway returned 500".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "DeliveryFailed");
        assert_eq!(json["message"], "gateway returned 500");
    }
}
