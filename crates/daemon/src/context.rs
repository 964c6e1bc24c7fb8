//! Application context - dependency injection container

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use wishbot_core::{DispatchService, ErrorRegistry, HandlerKind, RegistryError};
use wishbot_domain::{Config, ErrorCategory, Result, WishBotError};
use wishbot_infra::{
    DispatchScheduler, DispatchSchedulerConfig, FileBindingStore, FileContactDirectory,
    FileDispatchLedger, FileEventSource, HttpWishTransport, TokenStore,
};

/// Application context - holds all services and dependencies
pub struct AppContext {
    /// Loaded configuration, kept for diagnostics.
    pub config: Config,
    /// Error registry shared with the dispatch engine.
    pub registry: Arc<ErrorRegistry>,
    scheduler: DispatchScheduler,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire adapters into the engine and scheduler.
    ///
    /// A missing fetcher token is routed through the registry and does not
    /// block startup; missing transport credentials do.
    pub async fn new(config: Config) -> Result<Self> {
        let timezone = config.dispatch.timezone()?;

        let bindings = Arc::new(FileBindingStore::new(&config.store.error_handlers_path));
        let registry = Arc::new(ErrorRegistry::load(bindings).await?);
        seed_default_bindings(&registry).await;

        if let Err(err) = TokenStore::new(&config.store.token_path).ensure_present() {
            registry.route(&err, Utc::now()).await;
        }

        let transport = Arc::new(HttpWishTransport::new(&config.transport)?);
        let service = Arc::new(DispatchService::new(
            Arc::new(FileContactDirectory::new(&config.store.contacts_path)),
            Arc::new(FileEventSource::new(&config.store.events_path, timezone)),
            Arc::new(FileDispatchLedger::new(&config.store.ledger_path)),
            transport,
            registry.clone(),
        ));

        let scheduler = DispatchScheduler::with_config(
            DispatchSchedulerConfig {
                interval_seconds: config.dispatch.interval_seconds,
                ..Default::default()
            },
            service,
            timezone,
        );

        info!(
            interval_secs = config.dispatch.interval_seconds,
            timezone = %timezone,
            "application context initialized"
        );
        Ok(Self { config, registry, scheduler })
    }

    /// Start the poll loop.
    pub async fn start(&mut self) -> Result<()> {
        info!(
            interval_secs = self.config.dispatch.interval_seconds,
            "starting dispatch poll loop"
        );
        self.scheduler.start().await.map_err(WishBotError::from)
    }

    /// Stop the poll loop, letting an in-flight cycle finish.
    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler.stop().await.map_err(WishBotError::from)
    }
}

/// Seed the stock bindings. Registration is first-wins, so reruns after a
/// restart (or operator rebindings) are left untouched.
async fn seed_default_bindings(registry: &ErrorRegistry) {
    let seeds = [
        (ErrorCategory::TokenMissing, HandlerKind::FileNotFound),
        (ErrorCategory::ContactDirectoryUnavailable, HandlerKind::FileNotFound),
        (ErrorCategory::EventSourceUnavailable, HandlerKind::FileNotFound),
        (ErrorCategory::DeliveryFailed, HandlerKind::Network),
        (ErrorCategory::Storage, HandlerKind::Database),
    ];

    for (category, handler) in seeds {
        match registry.register(category, handler).await {
            Ok(()) | Err(RegistryError::AlreadyRegistered { .. }) => {}
            Err(RegistryError::Store(err)) => {
                warn!(category = %category, error = %err, "failed to persist seed binding");
            }
        }
    }
}
