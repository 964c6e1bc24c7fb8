//! Error registry - persisted category-to-handler bindings

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use wishbot_domain::{ErrorCategory, ErrorDetails, Result, WishBotError};

use super::error::RegistryError;
use super::handlers::HandlerKind;

/// Trait for the durable binding store backing the registry
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Load all persisted bindings (empty map when none exist yet).
    async fn load(&self) -> Result<HashMap<String, HandlerKind>>;

    /// Persist the full binding map atomically.
    async fn save(&self, bindings: &HashMap<String, HandlerKind>) -> Result<()>;
}

/// Error registry
///
/// Holds the hydrated binding map in memory and is the single source of
/// truth for which category maps to which handler. Registration is explicit
/// and first-wins; dispatch never registers and never fails.
pub struct ErrorRegistry {
    store: Arc<dyn BindingStore>,
    bindings: RwLock<HashMap<String, HandlerKind>>,
}

impl ErrorRegistry {
    /// Hydrate a registry from its durable store.
    ///
    /// # Errors
    /// Returns the store's error when the binding document exists but cannot
    /// be read.
    pub async fn load(store: Arc<dyn BindingStore>) -> Result<Self> {
        let bindings = store.load().await?;
        if !bindings.is_empty() {
            debug!(count = bindings.len(), "hydrated error handler bindings");
        }
        Ok(Self { store, bindings: RwLock::new(bindings) })
    }

    /// Bind a handler to a category. First registration wins.
    ///
    /// # Errors
    /// `RegistryError::AlreadyRegistered` when the category is already bound
    /// (the existing binding is untouched); `RegistryError::Store` when the
    /// new binding cannot be persisted (the in-memory map is rolled back).
    pub async fn register(
        &self,
        category: ErrorCategory,
        handler: HandlerKind,
    ) -> std::result::Result<(), RegistryError> {
        let mut bindings = self.bindings.write().await;
        if bindings.contains_key(category.as_str()) {
            return Err(RegistryError::AlreadyRegistered { category });
        }

        bindings.insert(category.as_str().to_string(), handler);
        if let Err(err) = self.store.save(&bindings).await {
            bindings.remove(category.as_str());
            return Err(RegistryError::Store(err));
        }

        info!(category = %category, handler = ?handler, "registered error handler");
        Ok(())
    }

    /// Route error details to the bound handler, or the built-in default
    /// when the category has no binding. Never registers, never fails.
    pub async fn dispatch(&self, category: ErrorCategory, message: &str, timestamp: DateTime<Utc>) {
        let details = ErrorDetails { message: message.to_string(), timestamp, category };
        let handler = {
            let bindings = self.bindings.read().await;
            bindings.get(category.as_str()).copied()
        };

        match handler {
            Some(handler) => handler.handle(&details),
            None => {
                debug!(category = %category, "no handler bound; using default");
                HandlerKind::Default.handle(&details);
            }
        }
    }

    /// Route an error under its own category.
    pub async fn route(&self, error: &WishBotError, timestamp: DateTime<Utc>) {
        self.dispatch(error.category(), &error.to_string(), timestamp).await;
    }

    /// Current binding for a category, if any.
    pub async fn binding(&self, category: ErrorCategory) -> Option<HandlerKind> {
        self.bindings.read().await.get(category.as_str()).copied()
    }
}
