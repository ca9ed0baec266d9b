//! modupd - Mod Upload Daemon
//!
//! Serves the mod upload function over HTTP, or runs it once against a
//! cloud-function event document.
//!
//! # Usage
//!
//! Run the HTTP server with defaults (0.0.0.0:8080):
//! ```bash
//! modupd
//! ```
//!
//! With a config file and a port override:
//! ```bash
//! modupd --config modupd.toml serve --port 9000
//! ```
//!
//! Handle one event from stdin:
//! ```bash
//! echo '{"httpMethod":"OPTIONS"}' | modupd invoke
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modup_api::{create_router, handle_event, AppState, FunctionContext, FunctionEvent};
use modup_core::AcknowledgeBackend;
use tokio::io::AsyncReadExt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::{DaemonConfig, LogFormat, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "modupd")]
#[command(about = "Mod upload acknowledgment service")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, env = "MODUPD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        bind: Option<IpAddr>,

        /// Port to listen on, overrides the config file
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Handle a single function event and print the response
    Invoke {
        /// Event file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        event: String,

        /// Request ID for the invocation (random if omitted)
        #[arg(long)]
        request_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };

    let command = args.command.unwrap_or(Command::Serve {
        bind: None,
        port: None,
    });

    // `invoke` prints its response on stdout, so logs go to stderr there
    let log_to_stderr = matches!(command, Command::Invoke { .. });
    init_logging(&config.logging, args.verbose, log_to_stderr);

    if let Some(path) = &args.config {
        tracing::info!(path = %path.display(), "Loaded config");
    }

    match command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Invoke { event, request_id } => invoke(config, &event, request_id).await,
    }
}

fn init_logging(config: &LoggingConfig, verbose: bool, to_stderr: bool) {
    let default_filter = if verbose {
        "modupd=debug,modup_api=debug,modup_core=debug,tower_http=debug"
    } else {
        config.filter.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let writer = if to_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
    }
}

fn app_state(config: DaemonConfig) -> AppState {
    AppState::with_settings(
        Arc::new(AcknowledgeBackend::new()),
        config.upload,
        config.cors,
    )
}

async fn serve(config: DaemonConfig) -> Result<()> {
    let addr = config.server.socket_addr();

    tracing::info!(
        route_path = %config.upload.normalized_route_path(),
        default_file_name = %config.upload.default_file_name,
        max_body_bytes = config.upload.max_body_bytes,
        "Starting modupd"
    );

    let app = create_router(app_state(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

async fn invoke(config: DaemonConfig, source: &str, request_id: Option<String>) -> Result<()> {
    let raw = if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("Failed to read event from stdin")?;
        raw
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read event {}", source))?
    };

    let event: FunctionEvent = serde_json::from_str(&raw).context("Invalid function event")?;
    let context = FunctionContext::new(
        request_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );

    let state = app_state(config);
    let response = handle_event(&state, event, &context).await;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
