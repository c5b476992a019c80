//! terabox_relay CLI - Serve or query the TeraBox relay.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use terabox_relay::collector::DEFAULT_MAX_DEPTH;
use terabox_relay::config::{ProviderConfig, ServerConfig};
use terabox_relay::relay_client::DEFAULT_RELAY_URL;
use terabox_relay::{create_router, format_file_list, AppState, RelayClient};

/// HTTP relay that flattens TeraBox shared folders.
#[derive(Parser)]
#[command(name = "terabox_relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    provider: ProviderConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service.
    Serve {
        #[command(flatten)]
        server: ServerConfig,
    },

    /// Show one level of a share through a running relay.
    Info {
        /// Share link.
        url: String,

        /// Relay base URL.
        #[arg(long, env = "TERABOX_API", default_value = DEFAULT_RELAY_URL)]
        api: String,
    },

    /// List every file of a share through a running relay.
    Files {
        /// Share link.
        url: String,

        /// How many folder levels to expand.
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: u32,

        /// Relay base URL.
        #[arg(long, env = "TERABOX_API", default_value = DEFAULT_RELAY_URL)]
        api: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("terabox_relay=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { server } => serve(&cli.provider, &server).await?,

        Commands::Info { url, api } => {
            let info = RelayClient::new(&api)
                .get_info(&url)
                .await
                .with_context(|| format!("Failed to fetch share info for {}", url))?;

            println!(
                "{} ({} file(s), {} folder(s))",
                info.title, info.total_files, info.total_folders
            );
            println!("{:<24} {:>10} {:<4} {}", "FS_ID", "SIZE", "DIR", "NAME");
            println!("{}", "-".repeat(70));
            for entry in info.files {
                println!(
                    "{:<24} {:>10} {:<4} {}",
                    entry.fs_id,
                    entry.size_readable,
                    if entry.is_dir { "d" } else { "-" },
                    entry.file_name.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::Files {
            url,
            max_depth,
            api,
        } => {
            let files = RelayClient::new(&api).get_all_files(&url, max_depth).await;
            println!("{}", format_file_list(files.as_ref()));
        }
    }

    Ok(())
}

async fn serve(provider: &ProviderConfig, server: &ServerConfig) -> Result<()> {
    info!("Starting terabox_relay v{}", env!("CARGO_PKG_VERSION"));
    info!("  Provider: {}", provider.base_url);
    info!("  Max concurrency: {}", server.max_concurrency);
    info!("  Max depth limit: {}", server.max_depth_limit);

    let client = provider
        .build_client()
        .context("Failed to create HTTP client")?;

    let state = AppState {
        api: Arc::new(client),
        max_concurrency: server.max_concurrency,
        max_depth_limit: server.max_depth_limit,
    };
    let app = create_router(state);

    let addr = server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
