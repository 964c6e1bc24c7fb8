//! Common data types used throughout the application

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ErrorCategory;

/// Message variant a calendar event resolves to.
///
/// `NewYear` wins over `Birthday` when the summary carries the new-year
/// marker, regardless of what the source record claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Generic,
    Birthday,
    NewYear,
}

/// Calendar event, immutable once parsed from the source snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Source-provided id, or a stable hash of summary + start when the
    /// source record carries none.
    pub id: String,
    pub summary: String,
    pub category: EventCategory,
    /// Scheduled start instant with the offset the source recorded it in.
    pub start: DateTime<FixedOffset>,
    /// Key into the contact directory (the event creator's email).
    pub creator_key: String,
}

/// Contact directory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Contact directory snapshot, keyed by contact key
pub type ContactBook = HashMap<String, Contact>;

/// Durable proof that a wish went out for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub event_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Payload handed to a recovery handler when an error is routed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub category: ErrorCategory,
}

/// Local wall-clock time in the reference timezone at which the transport
/// should deliver a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub hour: u32,
    pub minute: u32,
}

impl WallClock {
    /// Extract the wall-clock time of a zoned instant.
    pub fn from_datetime<Tz: chrono::TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self { hour: instant.hour(), minute: instant.minute() }
    }
}

impl std::fmt::Display for WallClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Outcome of one dispatch cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Events seen in the snapshot this cycle.
    pub scanned: usize,
    /// Wishes sent and recorded this cycle.
    pub dispatched: usize,
    /// Events skipped because the ledger already holds them.
    pub skipped_already_sent: usize,
    /// Events skipped by the due-date policy.
    pub skipped_not_due: usize,
    /// Failures routed to the error registry this cycle.
    pub failures: usize,
}
