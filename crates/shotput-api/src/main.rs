use shotput_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // `.env` may set RUST_LOG, so it is read before the subscriber is installed
    dotenvy::dotenv().ok();

    // Telemetry comes before the config so configuration diagnostics are logged
    shotput_api::telemetry::init_telemetry()?;

    let config = Config::load()?;

    let (_state, router) = shotput_api::setup::initialize_app(&config).await?;

    shotput_api::setup::server::start_server(&config.server, router).await?;

    Ok(())
}
