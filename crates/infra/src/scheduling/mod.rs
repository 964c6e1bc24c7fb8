//! Scheduling infrastructure for the poll loop
//!
//! One cron-backed scheduler drives the dispatch engine at a fixed interval.
//! Runtime rules: explicit lifecycle management (start/stop), join handles
//! for spawned tasks, cancellation token support, timeout wrapping on all
//! async operations, serialized cycles (a tick due while a cycle runs waits
//! for it instead of overlapping).

pub mod dispatch_scheduler;
pub mod error;

pub use dispatch_scheduler::{DispatchScheduler, DispatchSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
