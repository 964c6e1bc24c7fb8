//! Dispatch engine and its port interfaces

pub mod ports;
pub mod service;

pub use service::DispatchService;
