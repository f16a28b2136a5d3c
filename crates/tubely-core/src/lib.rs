//! Tubely Core Library
//!
//! Domain models, error types and configuration shared by every Tubely crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, IngestServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{StorageBackend, MAX_PRESIGN_TTL};
// Storage, StorageError and StorageResult live in tubely-storage
