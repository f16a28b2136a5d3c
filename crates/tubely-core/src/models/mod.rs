//! Data models for the application
//!
//! Domain types shared by the ingestion pipeline, the storage backends and the
//! HTTP surface.

mod media;
mod storage;
mod video;

pub use media::*;
pub use storage::*;
pub use video::*;
