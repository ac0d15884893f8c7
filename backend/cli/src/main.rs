mod api;
mod config;
mod settings_cmd;
mod terminal_output;
mod webhook_info;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use shimmer_channels::{
    FacebookWebhook, FacebookWebhookAdapter, LoggingLiveVideoHandler, QueuedLiveVideoHandler,
};
use shimmer_config::{validate, ConfigProvider, FallbackSecrets, LayeredConfigProvider};
use shimmer_core::LiveVideoHandler;

use config::ServerConfig;
use settings_cmd::SettingsCommand;

#[derive(Parser)]
#[command(name = "shimmer")]
#[command(about = "Shimmer: Facebook live video webhook receiver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Read or rotate stored webhook credentials
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Show the webhook URL and Facebook app setup steps
    WebhookInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    shimmer_logging::init_logger(config.log_dir.as_deref(), &config.log_level);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => {
            let config = ServerConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await
        }
        Commands::Settings { command } => settings_cmd::run(command, &config).await,
        Commands::WebhookInfo => {
            let provider = layered_provider(&config);
            webhook_info::run(&config, &provider).await
        }
    };

    if let Err(e) = result {
        terminal_output::note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

fn layered_provider(config: &ServerConfig) -> LayeredConfigProvider {
    LayeredConfigProvider::new(
        settings_cmd::settings_service(config),
        FallbackSecrets::from_env(),
    )
}

/// Report secrets that would make the endpoint reject every request.
async fn log_validation(provider: &dyn ConfigProvider) {
    let verify_token = provider.verify_token().await;
    let app_secret = provider.app_secret().await;
    let report = validate(verify_token.as_deref(), app_secret.as_deref());
    for finding in &report.errors {
        error!(setting = %finding.path, "{}", finding.message);
    }
    for finding in &report.warnings {
        warn!(setting = %finding.path, "{}", finding.message);
    }
}

/// The handler to mount, plus the queue worker to drain on shutdown when
/// dispatch is queued.
fn live_video_handler(
    config: &ServerConfig,
) -> (Arc<dyn LiveVideoHandler>, Option<JoinHandle<()>>) {
    let inner: Arc<dyn LiveVideoHandler> = Arc::new(LoggingLiveVideoHandler);
    match config.dispatch_queue {
        Some(capacity) => {
            let (queued, rx) = QueuedLiveVideoHandler::new(capacity);
            let worker = QueuedLiveVideoHandler::spawn_worker(rx, inner);
            info!(capacity, "Live video dispatch is queued");
            (Arc::new(queued), Some(worker))
        }
        None => (inner, None),
    }
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        settings = %config.settings_file.display(),
        "Starting Shimmer webhook receiver"
    );

    let provider = layered_provider(&config);
    log_validation(&provider).await;

    let (handler, worker) = live_video_handler(&config);
    let webhook = FacebookWebhook::new(Arc::new(provider), handler);
    let adapter = FacebookWebhookAdapter::new(webhook)
        .with_path(config.webhook_path.clone())
        .with_max_body_bytes(config.max_body_bytes);
    let app = api::build_router(&[&adapter]);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, path = %adapter.path(), "Webhook endpoint listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Dropping the adapter drops the last queue sender; the worker then
    // finishes what was already acknowledged and exits.
    drop(adapter);
    if let Some(worker) = worker {
        info!("Draining queued live video dispatches");
        if let Err(e) = worker.await {
            error!(error = %e, "Live video dispatch worker failed");
        }
    }

    served?;
    info!("Shimmer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
