//! LearnMate CLI
//!
//! Main entry point for running the LearnMate AI tutor backend.

use std::process::ExitCode;

use clap::Parser;
use learnmate_tutor::{create_router, AppState, Config};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// LearnMate - AI Tutor Backend
///
/// Serves the tutoring REST API, answering student questions through an
/// OpenAI-compatible chat-completion model with an offline fallback.
#[derive(Parser, Debug)]
#[command(name = "learnmate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Interface to bind (overrides HOST)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Port for the HTTP API server (overrides PORT)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("LearnMate tutor starting");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, binds the listener and serves until Ctrl+C.
async fn run_server(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    if !config.has_api_key() {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will be refused");
    }

    let host = config.host.clone();
    let port = config.port;
    let router = create_router(AppState::new(config)?);

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to bind to {host}:{port}: {e}\n\nSuggestion: Try a different port with --port"
            )
        })?;

    println!();
    println!("HTTP API server running on http://{host}:{port}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("LearnMate tutor stopped");
    Ok(())
}

/// Resolves when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Prints configuration summary.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Model: {}", config.model);
    println!("  API base URL: {}", config.api_base_url);
    println!(
        "  API key: {}",
        if config.has_api_key() { "set" } else { "missing" }
    );
    println!("  CORS origins: {}", config.cors_origins.join(", "));
    println!("  Upstream timeout: {}s", config.upstream_timeout_secs);
}
