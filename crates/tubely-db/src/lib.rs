//! Tubely Database Library
//!
//! Repositories for video metadata records. `PgVideoRepository` backs the
//! service in production; `InMemoryVideoRepository` serves local development
//! (no `DATABASE_URL`) and tests.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
