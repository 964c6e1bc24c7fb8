//! Registry error types

use thiserror::Error;
use wishbot_domain::{ErrorCategory, WishBotError};

/// Registry-specific errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A binding already exists for this category; first registration wins.
    #[error("Handler already registered for category '{category}'")]
    AlreadyRegistered {
        /// Category the rejected registration targeted.
        category: ErrorCategory,
    },

    /// The binding store could not be read or written.
    #[error("Binding store error: {0}")]
    Store(#[from] WishBotError),
}
