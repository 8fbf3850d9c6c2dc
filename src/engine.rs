//! Seam to the external background-removal library.
//!
//! The trait pair mirrors the library's two-call surface (create a session
//! for a model name, then feed it raw image bytes) so the registry, HTTP
//! handlers, and batch runner can be exercised against a mock in tests.

use std::sync::{mpsc, Arc};
use std::thread;

use imgly_bgremove::{
    BackendType, BackgroundRemovalProcessor, ModelSpecParser, OutputFormat, ProcessorConfig,
    ProcessorConfigBuilder,
};
use tracing::debug;

use crate::error::{BgCompareError, Result};

/// An initialized model handle, ready to run inference.
///
/// Expensive to construct (loads weights), cheap to reuse. Sessions are
/// shared via `Arc`; whether two concurrent calls on one session actually
/// run in parallel is up to the implementation.
pub trait InferenceSession: Send + Sync {
    /// One inference call: raw encoded image bytes in, PNG bytes out.
    fn remove_background(&self, image_bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Factory for model sessions.
pub trait InferenceBackend: Send + Sync {
    /// Construct a session for `model_name`.
    ///
    /// May take seconds, and fails when the library does not know the model.
    /// Callers decide whether that is fatal (startup) or skippable
    /// (per-request, per-batch-step).
    fn create_session(&self, model_name: &str) -> Result<Arc<dyn InferenceSession>>;
}

/// Production backend delegating to `imgly-bgremove`.
///
/// Uses the pure-Rust Tract backend and always emits PNG, since every
/// surface of this crate returns or writes PNG bytes. Model names are
/// anything `ModelSpecParser` accepts: a cached model id, an `id:variant`
/// pair, or a path to a model folder.
///
/// The library's processor holds trait objects with no `Send` bound, so a
/// session cannot wrap it directly and still cross threads. Instead each
/// session owns a dedicated worker thread that the processor lives on, and
/// the handle only carries a job channel.
#[derive(Debug, Default)]
pub struct ImglyBackend;

impl ImglyBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

type InferenceJob = (Vec<u8>, mpsc::Sender<Result<Vec<u8>>>);

impl InferenceBackend for ImglyBackend {
    fn create_session(&self, model_name: &str) -> Result<Arc<dyn InferenceSession>> {
        let model_spec = ModelSpecParser::parse(model_name);
        let config = ProcessorConfigBuilder::new()
            .model_spec(model_spec)
            .backend_type(BackendType::Tract)
            .output_format(OutputFormat::Png)
            .build()
            .map_err(|e| {
                BgCompareError::session(format!("invalid processor config for '{model_name}': {e}"))
            })?;

        let (job_tx, job_rx) = mpsc::channel::<InferenceJob>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let worker_name = model_name.to_owned();
        thread::Builder::new()
            .name(format!("inference-{model_name}"))
            .spawn(move || run_session_worker(config, &worker_name, &ready_tx, &job_rx))
            .map_err(|e| {
                BgCompareError::session(format!("failed to spawn worker for '{model_name}': {e}"))
            })?;

        // The worker loads the model before reporting ready, so an unknown
        // name fails here, not on the first inference call.
        match ready_rx.recv() {
            Ok(Ok(())) => {},
            Ok(Err(message)) => return Err(BgCompareError::session(message)),
            Err(_) => {
                return Err(BgCompareError::session(format!(
                    "worker for '{model_name}' exited during initialization"
                )))
            },
        }
        debug!(model = %model_name, "session worker ready");

        Ok(Arc::new(ImglySession {
            model_name: model_name.to_owned(),
            jobs: job_tx,
        }))
    }
}

/// Owns the processor for one session. The processor is constructed,
/// initialized, and driven entirely on this thread; the thread exits when
/// the last handle to the session is dropped.
fn run_session_worker(
    config: ProcessorConfig,
    model_name: &str,
    ready: &mpsc::Sender<std::result::Result<(), String>>,
    jobs: &mpsc::Receiver<InferenceJob>,
) {
    let mut processor = match BackgroundRemovalProcessor::new(config) {
        Ok(processor) => processor,
        Err(e) => {
            let _ = ready.send(Err(format!(
                "failed to create processor for '{model_name}': {e}"
            )));
            return;
        },
    };
    if let Err(e) = processor.initialize() {
        let _ = ready.send(Err(format!("failed to load model '{model_name}': {e}")));
        return;
    }
    let _ = ready.send(Ok(()));

    while let Ok((image_bytes, reply)) = jobs.recv() {
        let result = processor
            .process_bytes(&image_bytes)
            .and_then(|removal| removal.to_bytes(OutputFormat::Png, 100))
            .map_err(|e| BgCompareError::inference(format!("'{model_name}': {e}")));
        let _ = reply.send(result);
    }
}

/// Handle to a session's worker thread. Calls serialize per session (one
/// processor, one thread); distinct sessions still run in parallel.
struct ImglySession {
    model_name: String,
    jobs: mpsc::Sender<InferenceJob>,
}

impl InferenceSession for ImglySession {
    fn remove_background(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.jobs
            .send((image_bytes.to_vec(), reply_tx))
            .map_err(|_| {
                BgCompareError::inference(format!("worker for '{}' is gone", self.model_name))
            })?;
        reply_rx.recv().map_err(|_| {
            BgCompareError::inference(format!("worker for '{}' died mid-call", self.model_name))
        })?
    }
}
