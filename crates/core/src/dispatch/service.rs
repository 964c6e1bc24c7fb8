//! Dispatch engine - core business logic
//!
//! One `run_cycle` call scans the event snapshot, decides which events are
//! due in the reference timezone, composes and sends one wish per due event,
//! records successes in the ledger, and routes every failure through the
//! recovery registry. A cycle always completes; a single event's failure
//! never aborts it.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, instrument};
use wishbot_domain::constants::SEND_DELAY_MINUTES;
use wishbot_domain::{ContactBook, CycleReport, Event, WallClock, WishBotError};

use super::ports::{ContactDirectory, DispatchLedger, EventSource, RecordOutcome, WishTransport};
use crate::compose;
use crate::recovery::ErrorRegistry;

/// How a single event left the dispatch loop.
enum EventOutcome {
    Dispatched,
    AlreadySent,
    NotDue,
}

/// Dispatch engine
pub struct DispatchService {
    directory: Arc<dyn ContactDirectory>,
    source: Arc<dyn EventSource>,
    ledger: Arc<dyn DispatchLedger>,
    transport: Arc<dyn WishTransport>,
    registry: Arc<ErrorRegistry>,
}

impl DispatchService {
    /// Create a new dispatch engine over the given ports.
    pub fn new(
        directory: Arc<dyn ContactDirectory>,
        source: Arc<dyn EventSource>,
        ledger: Arc<dyn DispatchLedger>,
        transport: Arc<dyn WishTransport>,
        registry: Arc<ErrorRegistry>,
    ) -> Self {
        Self { directory, source, ledger, transport, registry }
    }

    /// Run one poll cycle at `now` in the reference timezone.
    ///
    /// Never fails: load errors produce an empty report after being routed,
    /// per-event errors are routed and counted in `failures`.
    #[instrument(skip(self), fields(now = %now))]
    pub async fn run_cycle(&self, now: DateTime<Tz>) -> CycleReport {
        let mut report = CycleReport::default();

        if let Err(err) = self.ledger.reload().await {
            self.route_failure(&mut report, &err).await;
            return report;
        }

        let contacts = match self.directory.fetch().await {
            Ok(contacts) => contacts,
            Err(err) => {
                self.route_failure(&mut report, &err).await;
                return report;
            }
        };

        let batch = match self.source.fetch_events().await {
            Ok(batch) => batch,
            Err(err) => {
                self.route_failure(&mut report, &err).await;
                return report;
            }
        };

        for err in &batch.malformed {
            self.route_failure(&mut report, err).await;
        }

        if batch.events.is_empty() {
            debug!("event snapshot is empty; nothing to dispatch");
            return report;
        }

        for event in &batch.events {
            report.scanned += 1;
            match self.process_event(event, &contacts, &now).await {
                Ok(EventOutcome::Dispatched) => report.dispatched += 1,
                Ok(EventOutcome::AlreadySent) => report.skipped_already_sent += 1,
                Ok(EventOutcome::NotDue) => report.skipped_not_due += 1,
                Err(err) => self.route_failure(&mut report, &err).await,
            }
        }

        info!(
            scanned = report.scanned,
            dispatched = report.dispatched,
            skipped_already_sent = report.skipped_already_sent,
            skipped_not_due = report.skipped_not_due,
            failures = report.failures,
            "dispatch cycle completed"
        );

        report
    }

    /// Handle one event end to end. Errors bubble up for routing.
    async fn process_event(
        &self,
        event: &Event,
        contacts: &ContactBook,
        now: &DateTime<Tz>,
    ) -> Result<EventOutcome, WishBotError> {
        if self.ledger.contains(&event.id).await? {
            debug!(event_id = %event.id, "wish already recorded; skipping");
            return Ok(EventOutcome::AlreadySent);
        }

        if !is_due(&event.start, now) {
            debug!(event_id = %event.id, start = %event.start, "event not due");
            return Ok(EventOutcome::NotDue);
        }

        let contact = contacts.get(&event.creator_key).ok_or_else(|| {
            WishBotError::PhoneNumberNotFound(format!(
                "no contact found for creator '{}'",
                event.creator_key
            ))
        })?;

        let phone = contact.phone.as_deref().filter(|p| !p.is_empty()).ok_or_else(|| {
            WishBotError::PhoneNumberNotFound(format!(
                "contact '{}' has no phone number",
                event.creator_key
            ))
        })?;

        let body = compose::compose(event, contact);

        // The transport needs a future wall-clock time even for "immediate"
        // sends; one minute out mirrors the source system.
        let send_at = WallClock::from_datetime(&(*now + Duration::minutes(SEND_DELAY_MINUTES)));
        self.transport.send(phone, &body, send_at).await?;

        match self.ledger.record(&event.id, now.with_timezone(&Utc)).await? {
            RecordOutcome::Recorded => {
                info!(event_id = %event.id, send_at = %send_at, "wish dispatched");
                Ok(EventOutcome::Dispatched)
            }
            // Only reachable if the contains() gate above missed the id.
            RecordOutcome::AlreadyPresent => Err(WishBotError::AlreadyDispatched(format!(
                "ledger already holds a record for event '{}'",
                event.id
            ))),
        }
    }

    async fn route_failure(&self, report: &mut CycleReport, err: &WishBotError) {
        report.failures += 1;
        self.registry.route(err, Utc::now()).await;
    }
}

/// Due policy: the start instant has passed AND it falls on the same
/// calendar date as `now` in the reference timezone. Future events and
/// events from a prior day are never due; there is no catch-up.
pub fn is_due(start: &DateTime<FixedOffset>, now: &DateTime<Tz>) -> bool {
    let start_local = start.with_timezone(&now.timezone());
    start_local.date_naive() == now.date_naive() && start_local <= *now
}
