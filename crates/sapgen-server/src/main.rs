//! SAP endpoint generator service.
//!
//! Wraps the external generator CLI and exposes it over HTTP or MCP stdio,
//! plus one-shot subcommands for local use.
//!
//! # Examples
//!
//! ```bash
//! # HTTP service on the default address
//! sapgen-server serve
//!
//! # MCP server over stdio
//! sapgen-server rpc
//!
//! # One generation from a request file
//! sapgen-server --store-root ./output generate request.json
//!
//! # Fetch a customer's code
//! sapgen-server download --customer acme --out acme.zip
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use sapgen_core::{CustomerName, ServiceConfig};
use sapgen_server::http;
use sapgen_server::rpc::GeneratorService;
use sapgen_server::state::AppState;
use sapgen_server::types::GenerateParams;
use sapgen_store::VolumeStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// SAP endpoint generator service.
#[derive(Parser, Debug)]
#[command(name = "sapgen-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true, env = "SAPGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Root of the output store (overrides the configuration file)
    #[arg(long, global = true, env = "SAPGEN_STORE_ROOT")]
    store_root: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API.
    Serve {
        /// Address to bind (overrides the configuration file)
        #[arg(long, env = "SAPGEN_BIND")]
        bind: Option<String>,
    },

    /// Serve MCP tools over stdio.
    Rpc,

    /// Run one generation from a JSON request file and print the result.
    ///
    /// The file has the same shape as the `POST /api/generate` body. The exit
    /// status is nonzero when the generator fails.
    Generate {
        /// Request file
        request: PathBuf,
    },

    /// Print customers with generated code as JSON.
    List,

    /// Write a customer's generated code to a zip file.
    Download {
        /// Customer name
        #[arg(long)]
        customer: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Loaded configuration");

    execute_command(cli.command, config).await
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sapgen=debug"))
    };

    // stdout carries MCP frames and command output
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    if let Some(root) = &cli.store_root {
        config.store_root.clone_from(root);
    }
    if let Commands::Serve { bind: Some(bind) } = &cli.command {
        config.bind_addr.clone_from(bind);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn execute_command(command: Commands, config: ServiceConfig) -> Result<ExitCode> {
    let store = Arc::new(VolumeStore::new(&config.store_root));

    match command {
        Commands::Serve { .. } => {
            store.ensure_root()?;
            let bind = config.bind_addr.clone();
            let state = AppState::new(config, store);

            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("binding {bind}"))?;
            tracing::info!(
                addr = %listener.local_addr()?,
                "Starting sapgen-server v{}",
                env!("CARGO_PKG_VERSION")
            );

            axum::serve(listener, http::router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rpc => {
            store.ensure_root()?;
            tracing::info!("Starting sapgen MCP server v{}", env!("CARGO_PKG_VERSION"));

            let service = GeneratorService::new(AppState::new(config, store))
                .serve(stdio())
                .await?;
            service.waiting().await?;

            tracing::info!("Server shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate { request } => {
            store.ensure_root()?;
            let text = std::fs::read_to_string(&request)
                .with_context(|| format!("reading {}", request.display()))?;
            let params: GenerateParams = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", request.display()))?;

            let state = AppState::new(config, store);
            let result = state.generate(&params.into_request()?).await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::List => {
            let customers = AppState::new(config, store).list_customers().await?;
            println!("{}", serde_json::to_string_pretty(&customers)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Download { customer, out } => {
            let customer = CustomerName::new(customer)?;
            let bytes = AppState::new(config, store).archive(customer).await?;

            std::fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
            println!("{} ({} bytes)", out.display(), bytes.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
