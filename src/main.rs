//! URL loader service binary.

use std::path::PathBuf;

use clap::Parser;

use url_loader::config::{self, LoaderConfig};
use url_loader::observability::init_logging;
use url_loader::service::{Listener, LoaderServer};

#[derive(Parser)]
#[command(name = "url-loader")]
#[command(about = "Single-request HTTP/HTTPS URL loader service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => LoaderConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("url-loader v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_hops = config.redirect.max_hops,
        https_enabled = config.https.enabled,
        rewrite_rules = config.rewrite.len(),
        "configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;
    let server = LoaderServer::new(&config);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
