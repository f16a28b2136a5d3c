use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Directives used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str =
    "tubely_api=debug,tubely_processing=debug,tubely_storage=debug,tubely_db=debug,tower_http=debug";

/// Install the global subscriber: compact console output filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(environment: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(console_fmt)
        .try_init()?;

    tracing::info!(environment = %environment, "Tracing initialized");
    Ok(())
}
