//! Offline comparison runner: a fixed model list over a directory of images.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use bg_compare::{logging, run_batch, BatchConfig, ImglyBackend};

/// Run every model over a directory of images and write the results per
/// image for side-by-side comparison
#[derive(Parser)]
#[command(name = "compare-models", version, about)]
struct Cli {
    /// Directory scanned for images [default: current directory]
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Where results go [default: <input-dir>/comparison_results]
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Model to run (repeatable) [default: built-in set]
    #[arg(short, long = "model", value_name = "MODEL")]
    models: Vec<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let input_dir = match cli.input_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let mut config = BatchConfig::for_input_dir(input_dir);
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if !cli.models.is_empty() {
        config.models = cli.models;
    }

    let backend = ImglyBackend::new();
    run_batch(&config, &backend).context("comparison run failed")?;
    Ok(())
}
