//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Dispatch policy constants
pub const NEW_YEAR_MARKER: &str = "new year's eve";
pub const SEND_DELAY_MINUTES: i64 = 1; // transport requires a future wall-clock time
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REFERENCE_TIMEZONE: &str = "Asia/Kolkata";

// Default store document names
pub const CONTACTS_FILE: &str = "contacts.json";
pub const EVENTS_FILE: &str = "calendar_events.json";
pub const LEDGER_FILE: &str = "sent_messages.json";
pub const ERROR_HANDLERS_FILE: &str = "error_handlers.json";
pub const TOKEN_FILE: &str = "token.json";
