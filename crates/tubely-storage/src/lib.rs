//! Tubely Storage Library
//!
//! Storage abstraction and backends for uploaded media. The `Storage` trait
//! covers what the ingestion pipeline needs from an object store: a streaming
//! put under a derived key, a time-bounded GET URL, and cleanup.
//!
//! # Key format
//!
//! Keys are derived by the pipeline as `[{orientation}/]{random}.{extension}`.
//! Every backend rejects keys containing `..`, a leading `/`, or a `,` (the
//! separator of the persisted `{bucket},{key}` reference). See [`keys`].

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult, MAX_PRESIGN_TTL};
pub use tubely_core::StorageBackend;
