use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{self, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gitsearch_proxy::config::ProxyConfig;
use gitsearch_proxy::gitsearch::{CodeSearchClient, SearchRequest};
use gitsearch_proxy::services;
use gitsearch_proxy::transport::http_server::{AppState, SearchProxyApp};

const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser)]
#[command(author, version = "0.1.0", about = "GitHub code search proxy scoped to an allow-list of repositories", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP search proxy
    Serve {
        /// Path to the YAML configuration file (defaults to config.yaml)
        config: Option<PathBuf>,
    },
    /// Run a single search and print the JSON response
    Search {
        /// Search term
        #[arg(help = "Search term - free text passed to GitHub code search")]
        query: String,

        /// Only search repositories belonging to this owner
        #[arg(short, long)]
        user: Option<String>,

        /// Path to the YAML configuration file (defaults to config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    match cli.command {
        Commands::Serve { config } => run_server(config).await,
        Commands::Search {
            query,
            user,
            config,
        } => run_search(query, user, config).await,
    }
}

/// Filter used when `RUST_LOG` is not set
///
/// The crate's own target needs an explicit level: a bare target directive enables TRACE.
fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("{level},{}={level}", env!("CARGO_CRATE_NAME"))
}

fn init_tracing(debug: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

fn load_config(config: Option<PathBuf>) -> Result<ProxyConfig> {
    let path = config.unwrap_or_else(|| {
        tracing::info!(
            "no configuration file specified, defaulting to {}",
            DEFAULT_CONFIG_FILE
        );
        PathBuf::from(DEFAULT_CONFIG_FILE)
    });

    let config = ProxyConfig::load(&path)?;
    tracing::info!(
        "Loaded {} repositories from {}",
        config.repos.len(),
        path.display()
    );

    Ok(config)
}

async fn run_server(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Access the search proxy at http://{}/search?q=", addr);

    let app = SearchProxyApp::new(addr, AppState::from_config(&config));
    app.serve().await?;

    Ok(())
}

async fn run_search(query: String, user: Option<String>, config: Option<PathBuf>) -> Result<()> {
    if query.is_empty() {
        anyhow::bail!("search term must be at least 1 character long");
    }

    let config = load_config(config)?;
    let client = CodeSearchClient::new(config.api_url.clone());
    let request = SearchRequest::new(query, user.unwrap_or_default());

    let response = services::perform_code_search(&client, &config.repos, &request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
