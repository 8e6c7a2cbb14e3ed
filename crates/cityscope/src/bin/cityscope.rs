use argh::FromArgs;
use cityscope::api::ApiClients;
use cityscope::{run_http_server, Cache, Config};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(FromArgs)]
/// Cityscope - location-based API aggregator
struct Args {
    /// port to listen on (overrides PORT)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// path to the cache database (overrides CITYSCOPE_DB)
    #[argh(option, short = 'd')]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(db) = args.db {
        config.db_path = PathBuf::from(db);
    }

    log::info!("Starting cityscope...");

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    // Set up Ctrl+C handler
    ctrlc::set_handler({
        let shutdown_tx = shutdown_tx.clone();
        move || {
            log::info!("Received Ctrl+C, shutting down gracefully...");
            shutdown_tx.send(()).ok();
        }
    })?;

    log::info!("Opening cache at {}", config.db_path.display());
    let cache = Cache::open(&config.db_path)?;

    let clients = Arc::new(ApiClients::new(&config));
    let cache = Arc::new(Mutex::new(cache));

    run_http_server(clients, cache, config.port, shutdown_rx).await?;

    log::info!("Cityscope stopped.");

    Ok(())
}
