//! closetd - Main entry point
//!
//! Wires the repositories, the closet service, the recognition bridge, and
//! the HTTP server together, then runs until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use closet_common::config::{resolve_data_folder, TomlConfig};
use closetd::api::{create_router, AppContext};
use closetd::bridge::{RecognitionBridge, RedisChannel};
use closetd::repo::{connect, FsFileRepository, SqliteClosetRepository};
use closetd::service::ClosetService;

const DEFAULT_PORT: u16 = 5750;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_REQUEST_CHANNEL: &str = "label-requests";
const DEFAULT_RESPONSE_CHANNEL: &str = "label-responses";

/// Command-line arguments for closetd
#[derive(Parser, Debug)]
#[command(name = "closetd")]
#[command(about = "Closet management service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "CLOSETD_PORT")]
    port: Option<u16>,

    /// Folder holding the closet database and image blobs
    #[arg(short, long, env = "CLOSETD_DATA_FOLDER")]
    data_folder: Option<String>,

    /// Redis server URL for the recognition channel
    #[arg(long, env = "CLOSETD_REDIS_URL")]
    redis_url: Option<String>,

    /// Channel carrying outbound recognition requests
    #[arg(long, env = "CLOSETD_REQUEST_CHANNEL")]
    request_channel: Option<String>,

    /// Channel carrying inbound recognition responses
    #[arg(long, env = "CLOSETD_RESPONSE_CHANNEL")]
    response_channel: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "closetd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // A malformed config file degrades to defaults rather than preventing
    // startup.
    let file_config = match TomlConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring config file: {}", e);
            None
        }
    };

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), file_config.as_ref());
    tokio::fs::create_dir_all(&data_folder)
        .await
        .context("Failed to create data folder")?;

    let port = args
        .port
        .or(file_config.as_ref().and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);
    let redis_url = args
        .redis_url
        .or(file_config.as_ref().and_then(|c| c.redis_url.clone()))
        .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
    let request_channel = args
        .request_channel
        .or(file_config.as_ref().and_then(|c| c.request_channel.clone()))
        .unwrap_or_else(|| DEFAULT_REQUEST_CHANNEL.to_string());
    let response_channel = args
        .response_channel
        .or(file_config.as_ref().and_then(|c| c.response_channel.clone()))
        .unwrap_or_else(|| DEFAULT_RESPONSE_CHANNEL.to_string());

    info!("Starting closetd on port {}", port);
    info!("Data folder: {}", data_folder.display());

    let db_path = data_folder.join("closet.db");
    let pool = connect(&db_path)
        .await
        .context("Failed to open closet database")?;
    let db = Arc::new(SqliteClosetRepository::new(
        pool,
        db_path.display().to_string(),
    ));

    let files = Arc::new(
        FsFileRepository::new(data_folder.join("images"))
            .await
            .context("Failed to initialize image repository")?,
    );

    // Bridge construction is fatal on failure: a service that cannot reach
    // the recognition channel does not start.
    let channel = Arc::new(
        RedisChannel::connect(&redis_url)
            .await
            .context("Failed to connect to redis")?,
    );
    let bridge = Arc::new(RecognitionBridge::new(
        channel,
        request_channel,
        response_channel,
    ));

    let service = Arc::new(ClosetService::new(db, files, bridge.clone()));
    info!("Closet service initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let receive_task = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        let service = Arc::clone(&service);
        async move { bridge.run_receive_loop(service, shutdown_rx).await }
    });

    let app = create_router(AppContext { service });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the recognition receive loop before exiting.
    let _ = shutdown_tx.send(true);
    if let Err(e) = receive_task.await {
        warn!("recognition receive loop did not stop cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
