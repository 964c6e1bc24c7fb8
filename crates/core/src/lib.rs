//! # WishBot Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The dispatch engine driving one poll cycle
//! - Message composition
//! - The pluggable error-recovery registry
//!
//! ## Architecture Principles
//! - Only depends on `wishbot-domain`
//! - No file, HTTP, or scheduler code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod compose;
pub mod dispatch;
pub mod recovery;

// Re-export specific items to avoid ambiguity
pub use dispatch::ports::{
    ContactDirectory, DispatchLedger, EventBatch, EventSource, RecordOutcome, WishTransport,
};
pub use dispatch::DispatchService;
pub use recovery::{BindingStore, ErrorRegistry, HandlerKind, RegistryError};
