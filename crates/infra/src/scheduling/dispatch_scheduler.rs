//! Poll-loop scheduler for periodic dispatch cycles.
//!
//! Drives the dispatch engine at a fixed interval: the first cycle runs
//! immediately on start, then a repeated job fires every
//! `interval_seconds`. Cycles are serialized through a mutex, so a tick that
//! lands while a cycle is still running waits for it to finish instead of
//! overlapping. Join handles are tracked, cancellation is explicit, and
//! every asynchronous operation is wrapped in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wishbot_infra::scheduling::{DispatchScheduler, DispatchSchedulerConfig, SchedulerResult};
//!
//! # async fn example(service: Arc<wishbot_core::DispatchService>) -> SchedulerResult<()> {
//! let mut scheduler = DispatchScheduler::with_config(
//!     DispatchSchedulerConfig {
//!         interval_seconds: 60,
//!         ..Default::default()
//!     },
//!     service,
//!     chrono_tz::Asia::Kolkata,
//! );
//!
//! scheduler.start().await?;
//! // ... daemon runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use chrono_tz::Tz;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use wishbot_core::DispatchService;
use wishbot_domain::constants::DEFAULT_POLL_INTERVAL_SECS;

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the dispatch scheduler.
#[derive(Debug, Clone)]
pub struct DispatchSchedulerConfig {
    /// Seconds between poll cycles.
    pub interval_seconds: u64,
    /// Timeout applied to a single cycle execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for DispatchSchedulerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Dispatch poll-loop scheduler with explicit lifecycle management.
pub struct DispatchScheduler {
    scheduler: Option<JobScheduler>,
    config: DispatchSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    service: Arc<DispatchService>,
    timezone: Tz,
    cycle_lock: Arc<Mutex<()>>,
}

impl DispatchScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new(service: Arc<DispatchService>, timezone: Tz) -> Self {
        Self::with_config(DispatchSchedulerConfig::default(), service, timezone)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(
        config: DispatchSchedulerConfig,
        service: Arc<DispatchService>,
        timezone: Tz,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            service,
            timezone,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Start the scheduler: one immediate cycle, then the repeated job.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        // The poll contract starts immediately, not one interval from now.
        Self::run_cycle_guarded(
            self.service.clone(),
            self.timezone,
            self.cycle_lock.clone(),
            self.config.job_timeout,
        )
        .await;

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?;

        start_result.map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(interval_secs = self.config.interval_seconds, "Dispatch scheduler started");
        Ok(())
    }

    /// Stop the scheduler, letting an in-flight cycle finish first.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?;

        stop_result.map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        // No mid-cycle abort: wait for the cycle lock so an in-flight cycle
        // completes before stop returns.
        let job_timeout = self.config.job_timeout;
        tokio::time::timeout(job_timeout, self.cycle_lock.lock())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: job_timeout.as_secs() })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Dispatch scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;

        let service = self.service.clone();
        let timezone = self.timezone;
        let cycle_lock = self.cycle_lock.clone();
        let job_timeout = self.config.job_timeout;
        let interval = Duration::from_secs(self.config.interval_seconds.max(1));

        let job_definition = Job::new_repeated_async(interval, move |_id, _lock| {
            let service = service.clone();
            let cycle_lock = cycle_lock.clone();

            Box::pin(async move {
                Self::run_cycle_guarded(service, timezone, cycle_lock, job_timeout).await;
            })
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        debug!(
            interval_secs = self.config.interval_seconds,
            job_id = %job_id,
            "Registered dispatch job"
        );
        Ok(scheduler)
    }

    /// Run one cycle under the serialization lock and a timeout.
    async fn run_cycle_guarded(
        service: Arc<DispatchService>,
        timezone: Tz,
        cycle_lock: Arc<Mutex<()>>,
        job_timeout: Duration,
    ) {
        let _guard = cycle_lock.lock().await;
        let started = Instant::now();
        let now = Utc::now().with_timezone(&timezone);

        match tokio::time::timeout(job_timeout, service.run_cycle(now)).await {
            Ok(report) => {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    dispatched = report.dispatched,
                    failures = report.failures,
                    "Dispatch cycle finished"
                );
            }
            Err(elapsed) => {
                warn!(timeout_secs = job_timeout.as_secs(), "Dispatch cycle timed out");
                debug!(elapsed = ?elapsed, "Timeout details");
            }
        }
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Dispatch scheduler monitor cancelled");
    }
}

impl Drop for DispatchScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("DispatchScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::DateTime;
    use wishbot_core::{
        BindingStore, ContactDirectory, DispatchLedger, ErrorRegistry, EventBatch, EventSource,
        HandlerKind, RecordOutcome, WishTransport,
    };
    use wishbot_domain::{ContactBook, Result, WallClock};

    use super::*;

    struct EmptyDirectory;

    #[async_trait]
    impl ContactDirectory for EmptyDirectory {
        async fn fetch(&self) -> Result<ContactBook> {
            Ok(ContactBook::new())
        }
    }

    struct EmptySource;

    #[async_trait]
    impl EventSource for EmptySource {
        async fn fetch_events(&self) -> Result<EventBatch> {
            Ok(EventBatch::default())
        }
    }

    struct NullLedger;

    #[async_trait]
    impl DispatchLedger for NullLedger {
        async fn reload(&self) -> Result<()> {
            Ok(())
        }

        async fn contains(&self, _event_id: &str) -> Result<bool> {
            Ok(false)
        }

        async fn record(
            &self,
            _event_id: &str,
            _sent_at: DateTime<Utc>,
        ) -> Result<RecordOutcome> {
            Ok(RecordOutcome::Recorded)
        }
    }

    struct NullTransport;

    #[async_trait]
    impl WishTransport for NullTransport {
        async fn send(&self, _phone: &str, _body: &str, _send_at: WallClock) -> Result<()> {
            Ok(())
        }
    }

    struct NullBindingStore;

    #[async_trait]
    impl BindingStore for NullBindingStore {
        async fn load(&self) -> Result<HashMap<String, HandlerKind>> {
            Ok(HashMap::new())
        }

        async fn save(&self, _bindings: &HashMap<String, HandlerKind>) -> Result<()> {
            Ok(())
        }
    }

    async fn idle_service() -> Arc<DispatchService> {
        let registry = Arc::new(
            ErrorRegistry::load(Arc::new(NullBindingStore)).await.expect("null store hydrates"),
        );
        Arc::new(DispatchService::new(
            Arc::new(EmptyDirectory),
            Arc::new(EmptySource),
            Arc::new(NullLedger),
            Arc::new(NullTransport),
            registry,
        ))
    }

    fn fast_config() -> DispatchSchedulerConfig {
        DispatchSchedulerConfig { interval_seconds: 1, ..Default::default() }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lifecycle_runs_successfully() {
        let service = idle_service().await;
        let mut scheduler =
            DispatchScheduler::with_config(fast_config(), service, chrono_tz::Asia::Kolkata);

        scheduler.start().await.expect("start succeeds");
        assert!(scheduler.is_running());
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn double_start_is_rejected() {
        let service = idle_service().await;
        let mut scheduler =
            DispatchScheduler::with_config(fast_config(), service, chrono_tz::Asia::Kolkata);

        scheduler.start().await.expect("first start");
        let err = scheduler.start().await.expect_err("second start fails");
        assert!(matches!(err, SchedulerError::AlreadyRunning));
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_without_start_is_rejected() {
        let service = idle_service().await;
        let mut scheduler =
            DispatchScheduler::with_config(fast_config(), service, chrono_tz::Asia::Kolkata);

        let err = scheduler.stop().await.expect_err("stop fails when idle");
        assert!(matches!(err, SchedulerError::NotRunning));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_after_stop_succeeds() {
        let service = idle_service().await;
        let mut scheduler =
            DispatchScheduler::with_config(fast_config(), service, chrono_tz::Asia::Kolkata);

        scheduler.start().await.expect("start succeeds");
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());

        scheduler.start().await.expect("start again");
        scheduler.stop().await.expect("stop again");
    }
}
