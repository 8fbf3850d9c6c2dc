//! Service entry point: eagerly build the model registry, then serve.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use bg_compare::{default_models, logging, server, ImglyBackend, ModelRegistry, ServerConfig};

/// Background-removal comparison API
#[derive(Parser)]
#[command(name = "bg-compare-server", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to bind
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory served as the frontend when it exists
    #[arg(long, default_value = "static")]
    assets_dir: PathBuf,

    /// Model to register at startup (repeatable) [default: built-in set]
    #[arg(short, long = "model", value_name = "MODEL")]
    models: Vec<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        assets_dir: cli.assets_dir,
        models: if cli.models.is_empty() {
            default_models()
        } else {
            cli.models
        },
    };

    // Slow on purpose: every model is loaded before the first request, and
    // a model the library does not know aborts startup.
    let backend = Arc::new(ImglyBackend::new());
    let registry = ModelRegistry::with_models(backend, config.models.iter().cloned())
        .context("failed to pre-load model sessions")?;

    server::serve(&config, Arc::new(registry))
        .await
        .context("server error")?;
    Ok(())
}
