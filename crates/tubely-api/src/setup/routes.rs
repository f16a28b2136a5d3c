//! Route configuration and setup.

use crate::auth::auth_middleware;
use crate::constants::{API_PREFIX, ASSETS_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers::{assets, health, thumbnail_upload, video_upload, videos};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};

/// Build the application router.
///
/// `/api/*` runs behind the JWT middleware. `/assets/*` is mounted only for
/// the local backend, where it serves signed playback URLs.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = api_routes(config).layer(axum::middleware::from_fn_with_state(
        state.jwt.clone(),
        auth_middleware,
    ));

    let mut app = Router::new()
        .route("/health", get(health::liveness_check))
        .nest(API_PREFIX, api_routes);

    if state.storage.backend_type() == StorageBackend::Local {
        app = app.route(
            &format!("{}/{{*key}}", ASSETS_PREFIX),
            get(assets::serve_asset),
        );
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

fn api_routes(config: &Config) -> Router<Arc<AppState>> {
    let video_body_limit = body_limit(config.max_video_size_bytes());
    let thumbnail_body_limit = body_limit(config.max_thumbnail_size_bytes());

    Router::new()
        .route(
            "/videos",
            post(videos::create_video).get(videos::list_videos),
        )
        .route("/videos/{video_id}", get(videos::get_video))
        .route(
            "/video_upload/{video_id}",
            post(video_upload::upload_video)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(video_body_limit)),
        )
        .route(
            "/thumbnail_upload/{video_id}",
            post(thumbnail_upload::upload_thumbnail)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(thumbnail_body_limit)),
        )
}

/// Request body cap for an upload route: the file limit plus multipart framing.
fn body_limit(file_limit: u64) -> usize {
    usize::try_from(file_limit.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
