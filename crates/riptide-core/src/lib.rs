//! Riptide Core Library
//!
//! This crate provides the shared foundation for Riptide: error types,
//! bridge configuration, sequence identifiers, and logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::BridgeConfig;
pub use error::{RiptideError, RiptideResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use types::SequenceId;
