//! Database repositories for data access layer
//!
//! `VideoRepository` is the seam the ingestion pipeline and HTTP handlers use;
//! each backend lives in its own module.

pub mod memory;
pub mod video;

pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository};
