//! Tracing setup

mod init;

pub use init::{init_telemetry, DEFAULT_LOG_FILTER};
