use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::RwLock;
use tracing_subscriber::filter::LevelFilter;

use vesyncd::api;
use vesyncd::config::Config;
use vesyncd::poller;
use vesyncd::Engine;
use vesyncd::HttpVesyncClient;
use vesyncd::SharedEngine;
use vesyncd::VesyncClient;

#[derive(Parser)]
#[command(version, about = "Bridge daemon for VeSync smart home devices")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "vesyncd.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(config.logging.level))
        .init();

    tracing::info!("vesyncd starting");
    tracing::info!("Loaded config from: {}", args.config);

    let mut client =
        HttpVesyncClient::new(&config.vesync).context("Failed to create VeSync client")?;
    client
        .login()
        .await
        .context("VeSync login failed, check credentials")?;
    let client: Arc<dyn VesyncClient> = Arc::new(client);

    let engine: SharedEngine = Arc::new(RwLock::new(Engine::new()));

    // First sync is fatal on failure: without a device list there is
    // nothing to serve.
    {
        let mut engine = engine.write().await;
        engine
            .poll_once(client.as_ref())
            .await
            .context("Initial device sync failed")?;
        tracing::info!(entities = engine.entity_count(), "initial device sync complete");
    }

    let (refresh_tx, refresh_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let api_task = if config.api.enabled {
        Some(tokio::spawn(api::serve(
            config.api.listen.clone(),
            config.api.port,
            Arc::clone(&engine),
            Arc::clone(&client),
            refresh_tx,
            shutdown_rx,
        )))
    } else {
        tracing::info!("HTTP API disabled");
        None
    };

    let poll_interval = config.vesync.poll_interval();
    let cooldown = config.vesync.debounce_cooldown();
    tokio::select! {
        _ = poller::run(
            Arc::clone(&engine),
            Arc::clone(&client),
            poll_interval,
            cooldown,
            refresh_rx,
        ) => {}
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    let _ = shutdown_tx.send(());
    if let Some(api_task) = api_task {
        if let Err(e) = api_task.await.context("API task panicked")? {
            tracing::error!("API server error: {}", e);
        }
    }

    tracing::info!("vesyncd shutdown complete");

    Ok(())
}
