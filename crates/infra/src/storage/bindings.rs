//! File-backed error-handler binding store

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use wishbot_core::{BindingStore, HandlerKind};
use wishbot_domain::Result;

use super::document::DocumentStore;

/// Durable category-to-handler-tag document
pub struct FileBindingStore {
    store: DocumentStore,
}

impl FileBindingStore {
    /// Create a binding store over the given document path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { store: DocumentStore::new(path) }
    }
}

#[async_trait]
impl BindingStore for FileBindingStore {
    async fn load(&self) -> Result<HashMap<String, HandlerKind>> {
        self.store.load_or_default()
    }

    async fn save(&self, bindings: &HashMap<String, HandlerKind>) -> Result<()> {
        self.store.write(bindings)
    }
}
