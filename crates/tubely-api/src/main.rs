use tubely_core::Config;

// mimalloc keeps fragmentation low under many concurrent uploads, especially on musl.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Database, storage, pipeline and routes
    let (_state, router) = tubely_api::setup::initialize_app(config.clone()).await?;

    tubely_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
