//! Shared test doubles for dispatch-engine tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::Mutex;
use wishbot_core::{
    BindingStore, ContactDirectory, DispatchLedger, ErrorRegistry, EventBatch, EventSource,
    HandlerKind, RecordOutcome, WishTransport,
};
use wishbot_domain::{Contact, ContactBook, Event, EventCategory, Result, WallClock, WishBotError};

/// Contact directory returning a fixed book, or failing on demand.
pub struct StaticDirectory {
    pub contacts: ContactBook,
    pub fail: bool,
}

impl StaticDirectory {
    pub fn with(contacts: ContactBook) -> Arc<Self> {
        Arc::new(Self { contacts, fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { contacts: ContactBook::new(), fail: true })
    }
}

#[async_trait]
impl ContactDirectory for StaticDirectory {
    async fn fetch(&self) -> Result<ContactBook> {
        if self.fail {
            return Err(WishBotError::ContactDirectoryUnavailable(
                "contacts.json is missing".into(),
            ));
        }
        Ok(self.contacts.clone())
    }
}

/// Event source returning a fixed batch, or failing on demand.
pub struct StaticEventSource {
    pub batch: EventBatch,
    pub fail: bool,
}

impl StaticEventSource {
    pub fn with(events: Vec<Event>) -> Arc<Self> {
        Arc::new(Self { batch: EventBatch { events, malformed: Vec::new() }, fail: false })
    }

    pub fn with_batch(batch: EventBatch) -> Arc<Self> {
        Arc::new(Self { batch, fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { batch: EventBatch::default(), fail: true })
    }
}

#[async_trait]
impl EventSource for StaticEventSource {
    async fn fetch_events(&self) -> Result<EventBatch> {
        if self.fail {
            return Err(WishBotError::EventSourceUnavailable(
                "calendar_events.json is missing".into(),
            ));
        }
        Ok(self.batch.clone())
    }
}

/// In-memory ledger with idempotent record semantics.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    pub reloads: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn seed(&self, event_id: &str, sent_at: DateTime<Utc>) {
        self.entries.lock().await.insert(event_id.to_string(), sent_at);
    }
}

#[async_trait]
impl DispatchLedger for MemoryLedger {
    async fn reload(&self) -> Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn contains(&self, event_id: &str) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(event_id))
    }

    async fn record(&self, event_id: &str, sent_at: DateTime<Utc>) -> Result<RecordOutcome> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(event_id) {
            return Ok(RecordOutcome::AlreadyPresent);
        }
        entries.insert(event_id.to_string(), sent_at);
        Ok(RecordOutcome::Recorded)
    }
}

/// One captured transport call.
#[derive(Debug, Clone)]
pub struct SentWish {
    pub phone: String,
    pub body: String,
    pub send_at: WallClock,
}

/// Transport double capturing every send; can be switched to fail.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<SentWish>>,
    pub fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl WishTransport for RecordingTransport {
    async fn send(&self, phone: &str, body: &str, send_at: WallClock) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(WishBotError::DeliveryFailed("gateway returned 500".into()));
        }
        self.sent.lock().await.push(SentWish {
            phone: phone.to_string(),
            body: body.to_string(),
            send_at,
        });
        Ok(())
    }
}

/// Binding store that never persists anywhere; good enough for engine tests.
#[derive(Default)]
pub struct NullBindingStore;

#[async_trait]
impl BindingStore for NullBindingStore {
    async fn load(&self) -> Result<HashMap<String, HandlerKind>> {
        Ok(HashMap::new())
    }

    async fn save(&self, _bindings: &HashMap<String, HandlerKind>) -> Result<()> {
        Ok(())
    }
}

pub async fn empty_registry() -> Arc<ErrorRegistry> {
    Arc::new(ErrorRegistry::load(Arc::new(NullBindingStore)).await.expect("null store hydrates"))
}

/// 2024-01-01 10:00 in the reference zone; the canonical test "now".
pub fn reference_now() -> DateTime<Tz> {
    chrono_tz::Asia::Kolkata.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
}

pub fn event(id: &str, summary: &str, start_rfc3339: &str, creator: &str) -> Event {
    Event {
        id: id.to_string(),
        summary: summary.to_string(),
        category: EventCategory::Generic,
        start: DateTime::parse_from_rfc3339(start_rfc3339).expect("test timestamp parses"),
        creator_key: creator.to_string(),
    }
}

pub fn contact(name: &str, phone: Option<&str>) -> Contact {
    Contact {
        name: name.to_string(),
        phone: phone.map(str::to_string),
        email: None,
        birthday: None,
    }
}

pub fn book(entries: Vec<(&str, Contact)>) -> ContactBook {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
