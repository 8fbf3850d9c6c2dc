//! Batch comparison runner: every configured model over every image in a
//! directory, results written per image for side-by-side inspection.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::{BatchConfig, SUPPORTED_EXTENSIONS};
use crate::engine::InferenceBackend;
use crate::error::Result;

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchSummary {
    /// Image files discovered in the input directory
    pub images_found: usize,
    /// Result files written
    pub outputs_written: usize,
    /// Skipped steps: unreadable images, failed sessions or inference calls
    pub failures: usize,
}

/// Image files directly under `dir` with a supported extension.
///
/// Extensions match case-insensitively; the result is deduplicated and
/// lexically sorted so runs are deterministic.
pub fn find_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(ext))
        {
            files.push(path);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Run the comparison: each model sequentially over each discovered image.
///
/// Per-image and per-model failures are logged and skipped; only filesystem
/// problems with the input or output roots abort the run. Existing outputs
/// are overwritten. A fresh session is constructed for every model
/// invocation and discarded afterwards, trading startup cost for a flat
/// memory profile over long runs.
pub fn run_batch(config: &BatchConfig, backend: &dyn InferenceBackend) -> Result<BatchSummary> {
    let run_started = Instant::now();

    if !config.output_dir.exists() {
        fs::create_dir_all(&config.output_dir)?;
        info!(dir = %config.output_dir.display(), "created output directory");
    }

    let images = find_image_files(&config.input_dir)?;
    let mut summary = BatchSummary {
        images_found: images.len(),
        ..BatchSummary::default()
    };

    if images.is_empty() {
        info!(dir = %config.input_dir.display(), "no images found");
        return Ok(summary);
    }
    info!(count = images.len(), dir = %config.input_dir.display(), "found images");

    for image_path in &images {
        let Some(stem) = image_path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %image_path.display(), "skipping file with non-UTF-8 name");
            continue;
        };
        info!(image = %image_path.display(), "processing");

        let image_bytes = match fs::read(image_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(image = %image_path.display(), error = %e, "failed to read, skipping");
                summary.failures += 1;
                continue;
            },
        };

        let image_out_dir = config.output_dir.join(stem);
        if let Err(e) = fs::create_dir_all(&image_out_dir) {
            error!(dir = %image_out_dir.display(), error = %e, "failed to create, skipping image");
            summary.failures += 1;
            continue;
        }

        for model in &config.models {
            let started = Instant::now();
            let output_path =
                image_out_dir.join(format!("{stem}_{}.png", sanitize_model_name(model)));

            let outcome = process_with_fresh_session(backend, model, &image_bytes)
                .and_then(|png| fs::write(&output_path, png).map_err(Into::into));

            match outcome {
                Ok(()) => {
                    summary.outputs_written += 1;
                    info!(
                        model = %model,
                        elapsed_s = started.elapsed().as_secs_f64(),
                        output = %output_path.display(),
                        "done"
                    );
                },
                Err(e) => {
                    summary.failures += 1;
                    error!(model = %model, image = %image_path.display(), error = %e, "failed");
                },
            }
        }
    }

    info!(
        images = summary.images_found,
        outputs = summary.outputs_written,
        failures = summary.failures,
        total_s = run_started.elapsed().as_secs_f64(),
        "comparison complete"
    );
    Ok(summary)
}

fn process_with_fresh_session(
    backend: &dyn InferenceBackend,
    model: &str,
    image_bytes: &[u8],
) -> Result<Vec<u8>> {
    let session = backend.create_session(model)?;
    session.remove_background(image_bytes)
}

/// Variant suffixes use `:`, which is not filename-safe everywhere.
fn sanitize_model_name(model: &str) -> String {
    model.replace([':', '/', '\\'], "-")
}
