//! Shared mock inference backend for integration tests.
//!
//! Fabricates sessions without touching any model weights, and counts
//! session constructions and inference calls so tests can assert that no
//! inference happens on rejected requests.

#![allow(dead_code)]
#![allow(unreachable_pub)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bg_compare::{BgCompareError, InferenceBackend, InferenceSession, Result};

/// Stand-in payload; tests care about bytes round-tripping, not pixels.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

pub struct MockBackend {
    pub sessions_created: AtomicUsize,
    pub inference_calls: Arc<AtomicUsize>,
    fail_create: HashSet<String>,
    fail_infer: HashSet<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            sessions_created: AtomicUsize::new(0),
            inference_calls: Arc::new(AtomicUsize::new(0)),
            fail_create: HashSet::new(),
            fail_infer: HashSet::new(),
        }
    }

    /// Session construction fails for the given model names.
    pub fn failing_create(names: &[&str]) -> Self {
        let mut backend = Self::new();
        backend.fail_create = names.iter().map(|n| (*n).to_string()).collect();
        backend
    }

    /// Sessions are constructed but their inference calls fail for the
    /// given model names.
    pub fn failing_inference(names: &[&str]) -> Self {
        let mut backend = Self::new();
        backend.fail_infer = names.iter().map(|n| (*n).to_string()).collect();
        backend
    }
}

impl InferenceBackend for MockBackend {
    fn create_session(&self, model_name: &str) -> Result<Arc<dyn InferenceSession>> {
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.contains(model_name) {
            return Err(BgCompareError::session(format!(
                "unknown model '{model_name}'"
            )));
        }
        Ok(Arc::new(MockSession {
            model_name: model_name.to_owned(),
            fail: self.fail_infer.contains(model_name),
            calls: Arc::clone(&self.inference_calls),
        }))
    }
}

struct MockSession {
    model_name: String,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl InferenceSession for MockSession {
    fn remove_background(&self, _image_bytes: &[u8]) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BgCompareError::inference(format!(
                "'{}' refused the image",
                self.model_name
            )));
        }
        Ok(FAKE_PNG.to_vec())
    }
}
