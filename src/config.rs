//! Runtime configuration for the two entry points.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Models registered at startup when none are given on the command line.
///
/// These are cache identifiers as understood by `imgly-bgremove`
/// (`owner--repo[:variant]`). The fp32 and fp16 variants of a model are
/// listed separately so a comparison run shows the quality/speed trade-off.
/// Kept to a small set to avoid exhausting memory on smaller machines.
pub const DEFAULT_MODELS: &[&str] = &[
    "imgly--isnet-general-onnx",
    "imgly--isnet-general-onnx:fp16",
    "imgly--birefnet-portrait",
    "imgly--birefnet-portrait:fp16",
];

/// Extensions the batch runner treats as images, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// The default model list as owned strings.
#[must_use]
pub fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| (*m).to_string()).collect()
}

/// Configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
    /// Directory mounted as the static frontend when it exists
    pub assets_dir: PathBuf,
    /// Models pre-loaded into the registry, in order
    pub models: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            assets_dir: PathBuf::from("static"),
            models: default_models(),
        }
    }
}

/// Configuration for one batch comparison run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned (non-recursively) for images
    pub input_dir: PathBuf,
    /// Root of the per-image result folders
    pub output_dir: PathBuf,
    /// Models run over every image, in order
    pub models: Vec<String>,
}

impl BatchConfig {
    /// Defaults for a run over `input_dir`: results go to a
    /// `comparison_results` subdirectory and the default model list applies.
    #[must_use]
    pub fn for_input_dir(input_dir: PathBuf) -> Self {
        let output_dir = input_dir.join("comparison_results");
        Self {
            input_dir,
            output_dir,
            models: default_models(),
        }
    }
}
