//! Test helpers: build AppState and router for integration tests.
//!
//! Records live in the in-memory repository and objects in a temporary local
//! store, so `cargo test -p tubely-api` needs neither Postgres nor ffmpeg.

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::constants;
use tubely_api::setup::{build_state, routes};
use tubely_api::state::AppState;
use tubely_core::models::Video;
use tubely_core::{BaseConfig, Config, IngestServiceConfig, StorageBackend};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{LocalStorage, Storage};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_SIGNING_SECRET: &str = "test-url-signing-secret-at-least-32-chars";
pub const TEST_BUCKET: &str = "tubely";
pub const TEST_ORIGIN: &str = "http://localhost:8091";

/// API path for tests (e.g. `/api/videos`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, state and owned temp directories.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub runner: Arc<fixtures::FakeMediaTools>,
    pub _storage_dir: TempDir,
    pub _scratch_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a draft owned by `owner_id` straight into the repository.
    pub async fn seed_video(&self, owner_id: Uuid, title: &str) -> Video {
        self.state
            .videos
            .create(&Video::new(owner_id, title.to_string(), String::new()))
            .await
            .expect("Failed to seed video")
    }
}

pub fn create_test_config(storage_dir: &TempDir, scratch_dir: &TempDir) -> Config {
    Config::new(IngestServiceConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
        },
        database_url: None,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some(storage_dir.path().display().to_string()),
        local_storage_base_url: Some(format!("{}{}", TEST_ORIGIN, constants::ASSETS_PREFIX)),
        local_storage_bucket: TEST_BUCKET.to_string(),
        url_signing_secret: Some(TEST_SIGNING_SECRET.to_string()),
        max_video_size_bytes: 1024 * 1024,
        max_thumbnail_size_bytes: 64 * 1024,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        scratch_dir: Some(scratch_dir.path().to_path_buf()),
        playback_url_ttl_secs: 3600,
        upload_timeout_secs: 30,
    })
}

/// Build the app with fake media tools reporting a 1920x1080 stream.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(fixtures::FakeMediaTools::new(1920, 1080)).await
}

pub async fn setup_test_app_with(runner: fixtures::FakeMediaTools) -> TestApp {
    setup_test_app_configured(runner, |_| {}).await
}

/// Build the app after adjusting the test config.
pub async fn setup_test_app_configured(
    runner: fixtures::FakeMediaTools,
    configure: impl FnOnce(&mut IngestServiceConfig),
) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");
    let scratch_dir = tempfile::tempdir().expect("Failed to create scratch dir");
    let mut config = create_test_config(&storage_dir, &scratch_dir);
    configure(&mut config.0);

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(
            storage_dir.path(),
            TEST_BUCKET.to_string(),
            format!("{}{}", TEST_ORIGIN, constants::ASSETS_PREFIX),
            TEST_SIGNING_SECRET,
        )
        .await
        .expect("Failed to create local storage"),
    );
    let videos: Arc<dyn VideoRepository> = Arc::new(InMemoryVideoRepository::new());
    let runner = Arc::new(runner);

    let state = build_state(config.clone(), videos, storage, runner.clone());
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        runner,
        _storage_dir: storage_dir,
        _scratch_dir: scratch_dir,
    }
}

/// Split a signed playback URL into a server path and its raw query.
pub fn signed_url_parts(url: &str) -> (String, String) {
    let relative = url
        .strip_prefix(TEST_ORIGIN)
        .unwrap_or_else(|| panic!("URL not served by the test app: {}", url));
    let (path, query) = relative
        .split_once('?')
        .unwrap_or_else(|| panic!("URL has no signature: {}", url));
    (path.to_string(), query.to_string())
}
