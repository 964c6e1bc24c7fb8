//! Durable JSON document storage
//!
//! All persisted state lives in small whole-document JSON files written with
//! atomic temp-file-then-rename swaps. Single-writer access is assumed; the
//! serialized poll loop is the only mutator.

pub mod bindings;
pub mod document;
pub mod ledger;

pub use bindings::FileBindingStore;
pub use document::DocumentStore;
pub use ledger::FileDispatchLedger;
