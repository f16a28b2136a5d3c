//! Application state shared by all handlers.

use std::sync::Arc;

use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{IngestPipeline, PlaybackUrlSigner};
use tubely_storage::Storage;

use crate::auth::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub pipeline: IngestPipeline,
    pub signer: PlaybackUrlSigner,
    pub jwt: Arc<JwtKeys>,
}
