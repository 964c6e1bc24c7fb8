//! Calendar event snapshot adapter
//!
//! Reads the `calendar_events.json` document the external fetcher maintains
//! (raw Google Calendar items). Individually malformed records do not fail
//! the fetch; they come back as `MalformedEvent` values in the batch for the
//! engine to route.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use wishbot_core::compose::is_new_year_event;
use wishbot_core::{EventBatch, EventSource};
use wishbot_domain::{Event, EventCategory, Result, WishBotError};

const BIRTHDAY_EVENT_TYPE: &str = "birthday";
const UNKNOWN_CREATOR: &str = "Unknown Contact";
const NO_SUMMARY: &str = "No Summary";

/// Event record as the fetcher writes it (Google Calendar item subset)
#[derive(Debug, Deserialize)]
struct RawEvent {
    id: Option<String>,
    summary: Option<String>,
    creator: Option<RawCreator>,
    start: Option<RawStart>,
    #[serde(rename = "eventType")]
    event_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCreator {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStart {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

/// File-backed event source
pub struct FileEventSource {
    path: PathBuf,
    reference_timezone: Tz,
}

impl FileEventSource {
    /// Create an event-source adapter over the given snapshot path.
    /// All-day records resolve to midnight in `reference_timezone`.
    pub fn new(path: impl Into<PathBuf>, reference_timezone: Tz) -> Self {
        Self { path: path.into(), reference_timezone }
    }

    fn parse_record(&self, index: usize, value: serde_json::Value) -> Result<Event> {
        let raw: RawEvent = serde_json::from_value(value).map_err(|e| {
            WishBotError::MalformedEvent(format!("record {} is not an event object: {}", index, e))
        })?;

        let summary = raw
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        let start_raw = raw.start.ok_or_else(|| {
            WishBotError::MalformedEvent(format!("record {} ('{}') has no start", index, summary))
        })?;
        let (start, start_key) = self.parse_start(&start_raw, index, &summary)?;

        // Missing creators resolve to a key no contact has, surfacing later
        // as PhoneNumberNotFound, same as the source system.
        let creator_key = raw
            .creator
            .and_then(|c| c.email)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| UNKNOWN_CREATOR.to_string());

        let category = if is_new_year_event(&summary) {
            EventCategory::NewYear
        } else if raw.event_type.as_deref() == Some(BIRTHDAY_EVENT_TYPE) {
            EventCategory::Birthday
        } else {
            EventCategory::Generic
        };

        let id = raw.id.filter(|i| !i.is_empty()).unwrap_or_else(|| stable_event_id(&summary, &start_key));

        Ok(Event { id, summary, category, start, creator_key })
    }

    fn parse_start(
        &self,
        start: &RawStart,
        index: usize,
        summary: &str,
    ) -> Result<(DateTime<FixedOffset>, String)> {
        if let Some(date_time) = &start.date_time {
            let parsed = DateTime::parse_from_rfc3339(date_time).map_err(|e| {
                WishBotError::MalformedEvent(format!(
                    "record {} ('{}') has unparseable start '{}': {}",
                    index, summary, date_time, e
                ))
            })?;
            return Ok((parsed, date_time.clone()));
        }

        if let Some(date) = &start.date {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                WishBotError::MalformedEvent(format!(
                    "record {} ('{}') has unparseable start date '{}': {}",
                    index, summary, date, e
                ))
            })?;
            let midnight = day.and_hms_opt(0, 0, 0).ok_or_else(|| {
                WishBotError::MalformedEvent(format!(
                    "record {} ('{}') start date '{}' has no midnight",
                    index, summary, date
                ))
            })?;
            let zoned = self
                .reference_timezone
                .from_local_datetime(&midnight)
                .earliest()
                .ok_or_else(|| {
                    WishBotError::MalformedEvent(format!(
                        "record {} ('{}') start date '{}' does not exist in {}",
                        index, summary, date, self.reference_timezone
                    ))
                })?;
            return Ok((zoned.fixed_offset(), date.clone()));
        }

        Err(WishBotError::MalformedEvent(format!(
            "record {} ('{}') has neither start.dateTime nor start.date",
            index, summary
        )))
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn fetch_events(&self) -> Result<EventBatch> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            WishBotError::EventSourceUnavailable(format!(
                "Events file not found. Ensure you have fetched events first. ({}: {})",
                self.path.display(),
                e
            ))
        })?;

        let records: Vec<serde_json::Value> = serde_json::from_str(&contents).map_err(|e| {
            WishBotError::EventSourceUnavailable(format!(
                "Invalid events document {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut batch = EventBatch::default();
        for (index, value) in records.into_iter().enumerate() {
            match self.parse_record(index, value) {
                Ok(event) => batch.events.push(event),
                Err(err) => batch.malformed.push(err),
            }
        }

        debug!(
            events = batch.events.len(),
            malformed = batch.malformed.len(),
            "event snapshot loaded"
        );
        Ok(batch)
    }
}

/// Stable id for records the source gave none: a Sha256 digest over the
/// summary and the raw start string, unchanged across refetches.
fn stable_event_id(summary: &str, start_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(summary.as_bytes());
    hasher.update(start_key.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn load(json: &str) -> EventBatch {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar_events.json");
        std::fs::write(&path, json).unwrap();
        let source = FileEventSource::new(path, chrono_tz::Asia::Kolkata);
        source.fetch_events().await.unwrap()
    }

    #[tokio::test]
    async fn parses_timed_events() {
        let batch = load(
            r#"[{
                "id": "evt-1",
                "summary": "Diwali dinner",
                "creator": {"email": "friend@example.com"},
                "start": {"dateTime": "2024-01-01T09:30:00+05:30"}
            }]"#,
        )
        .await;

        assert!(batch.malformed.is_empty());
        let event = &batch.events[0];
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.category, EventCategory::Generic);
        assert_eq!(event.start.to_rfc3339(), "2024-01-01T09:30:00+05:30");
        assert_eq!(event.creator_key, "friend@example.com");
    }

    #[tokio::test]
    async fn all_day_events_start_at_reference_midnight() {
        let batch = load(
            r#"[{
                "id": "bday-1",
                "summary": "Asha",
                "eventType": "birthday",
                "creator": {"email": "asha@example.com"},
                "start": {"date": "2024-01-01"}
            }]"#,
        )
        .await;

        let event = &batch.events[0];
        assert_eq!(event.category, EventCategory::Birthday);
        assert_eq!(event.start.to_rfc3339(), "2024-01-01T00:00:00+05:30");
    }

    #[tokio::test]
    async fn new_year_summary_overrides_event_type() {
        let batch = load(
            r#"[{
                "id": "nye-1",
                "summary": "New Year's Eve countdown",
                "eventType": "birthday",
                "creator": {"email": "asha@example.com"},
                "start": {"dateTime": "2024-12-31T20:00:00+05:30"}
            }]"#,
        )
        .await;

        assert_eq!(batch.events[0].category, EventCategory::NewYear);
    }

    #[tokio::test]
    async fn missing_id_derives_a_stable_hash() {
        let json = r#"[{
            "summary": "Diwali dinner",
            "creator": {"email": "friend@example.com"},
            "start": {"dateTime": "2024-01-01T09:30:00+05:30"}
        }]"#;

        let first = load(json).await.events[0].id.clone();
        let second = load(json).await.events[0].id.clone();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
    }

    #[tokio::test]
    async fn startless_records_are_malformed_not_fatal() {
        let batch = load(
            r#"[
                {"id": "bad-1", "summary": "Mystery", "creator": {"email": "x@example.com"}},
                {
                    "id": "evt-2",
                    "summary": "Lunch",
                    "creator": {"email": "friend@example.com"},
                    "start": {"dateTime": "2024-01-01T12:30:00+05:30"}
                }
            ]"#,
        )
        .await;

        assert_eq!(batch.malformed.len(), 1);
        assert!(matches!(batch.malformed[0], WishBotError::MalformedEvent(_)));
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].id, "evt-2");
    }

    #[tokio::test]
    async fn missing_creator_falls_back_to_unknown_key() {
        let batch = load(
            r#"[{
                "id": "evt-3",
                "summary": "Standup",
                "start": {"dateTime": "2024-01-01T09:00:00+05:30"}
            }]"#,
        )
        .await;

        assert_eq!(batch.events[0].creator_key, "Unknown Contact");
    }

    #[tokio::test]
    async fn missing_file_is_event_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileEventSource::new(dir.path().join("absent.json"), chrono_tz::Asia::Kolkata);
        let err = source.fetch_events().await.unwrap_err();
        assert!(matches!(err, WishBotError::EventSourceUnavailable(_)));
    }
}
