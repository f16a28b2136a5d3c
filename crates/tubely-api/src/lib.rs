//! Tubely API Library
//!
//! HTTP surface of the ingestion service: video records, the two upload
//! endpoints, signed asset serving for the local backend and application setup.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
