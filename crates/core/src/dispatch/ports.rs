//! Port interfaces for the dispatch engine
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use wishbot_domain::{ContactBook, Event, Result, WallClock, WishBotError};

/// Trait for loading the contact directory snapshot
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Fetch the full contact book, keyed by contact key.
    async fn fetch(&self) -> Result<ContactBook>;
}

/// Result of one event-source fetch.
///
/// Per-record parse failures come back as values so the engine can route
/// each of them without losing the records that did parse.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    /// Events that parsed cleanly, in source order.
    pub events: Vec<Event>,
    /// One error per record that could not be turned into an [`Event`].
    pub malformed: Vec<WishBotError>,
}

/// Trait for loading the calendar event snapshot
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the ordered event collection.
    async fn fetch_events(&self) -> Result<EventBatch>;
}

/// Outcome of an idempotent ledger record call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The id was not present and is now recorded.
    Recorded,
    /// The id was already present; nothing was written.
    AlreadyPresent,
}

/// Trait for the durable dispatch ledger
#[async_trait]
pub trait DispatchLedger: Send + Sync {
    /// Re-read the backing document into memory. Called at cycle start.
    async fn reload(&self) -> Result<()>;

    /// Whether a wish was already recorded for this event id.
    async fn contains(&self, event_id: &str) -> Result<bool>;

    /// Record a dispatched wish. Idempotent: recording an id twice leaves
    /// the first record in place and reports [`RecordOutcome::AlreadyPresent`].
    async fn record(&self, event_id: &str, sent_at: DateTime<Utc>) -> Result<RecordOutcome>;
}

/// Trait for the outbound wish transport
#[async_trait]
pub trait WishTransport: Send + Sync {
    /// Schedule a message to `phone` at a wall-clock time in the reference
    /// timezone. The time must lie in the future relative to the call.
    async fn send(&self, phone: &str, body: &str, send_at: WallClock) -> Result<()>;
}
