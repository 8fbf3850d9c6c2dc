//! # Background Removal Comparison
//!
//! Thin orchestration over the external `imgly-bgremove` inference library,
//! exposed through two surfaces:
//!
//! - an HTTP API (`POST /remove-bg`) that fans one uploaded image out to
//!   every registered model concurrently and returns base64 data URIs, and
//! - a batch runner (`compare-models`) that runs the same models over a
//!   directory of images and writes results to disk for side-by-side
//!   inspection.
//!
//! All segmentation work happens inside the library; this crate only wires
//! configuration, concurrency, and I/O around it. The seam is the
//! [`InferenceBackend`] / [`InferenceSession`] trait pair, so everything
//! above it can be exercised without model weights.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bg_compare::{ImglyBackend, ModelRegistry};
//!
//! # fn example() -> bg_compare::Result<()> {
//! let backend = Arc::new(ImglyBackend::new());
//! let registry = ModelRegistry::with_models(backend, ["imgly--isnet-general-onnx"])?;
//! let session = registry.get_or_create("imgly--isnet-general-onnx")?;
//! let png = session.remove_background(&std::fs::read("input.jpg")?)?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod registry;
pub mod server;

pub use batch::{find_image_files, run_batch, BatchSummary};
pub use config::{default_models, BatchConfig, ServerConfig, DEFAULT_MODELS, SUPPORTED_EXTENSIONS};
pub use engine::{ImglyBackend, InferenceBackend, InferenceSession};
pub use error::{BgCompareError, Result};
pub use registry::ModelRegistry;
pub use server::{build_router, serve, AppState};
