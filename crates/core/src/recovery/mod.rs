//! Pluggable error-recovery registry
//!
//! A persisted mapping from error category to a handler from a closed set.
//! The registry is an explicit object injected into the dispatch engine;
//! there is no process-wide handler table.

pub mod error;
pub mod handlers;
pub mod registry;

pub use error::RegistryError;
pub use handlers::HandlerKind;
pub use registry::{BindingStore, ErrorRegistry};
