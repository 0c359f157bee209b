use reelgate_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    reelgate_api::telemetry::init_telemetry(&config);

    // Initialize the application (storage, registry, pipeline, routes)
    let (_state, router) = reelgate_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    reelgate_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
