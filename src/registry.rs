//! Model registry: eagerly built sessions plus an on-demand fallback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::engine::{InferenceBackend, InferenceSession};
use crate::error::Result;

/// Mapping from model name to a pre-initialized session.
///
/// Built once at startup and shared read-only afterwards; nothing mutates
/// after construction, so concurrent lookups need no locking. Thread safety
/// of one session under concurrent use is the session's own business.
pub struct ModelRegistry {
    backend: Arc<dyn InferenceBackend>,
    names: Vec<String>,
    sessions: HashMap<String, Arc<dyn InferenceSession>>,
}

impl ModelRegistry {
    /// Eagerly create one session per name, in order, skipping duplicates.
    ///
    /// Any failure aborts construction: a model the library does not know
    /// at startup is an operator configuration error, not something to
    /// limp along without.
    pub fn with_models<I, S>(backend: Arc<dyn InferenceBackend>, models: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut sessions: HashMap<String, Arc<dyn InferenceSession>> = HashMap::new();

        for name in models {
            let name = name.into();
            if sessions.contains_key(&name) {
                continue;
            }
            let started = Instant::now();
            let session = backend.create_session(&name)?;
            info!(
                model = %name,
                elapsed_s = started.elapsed().as_secs_f64(),
                "model session ready"
            );
            sessions.insert(name.clone(), session);
            names.push(name);
        }

        Ok(Self {
            backend,
            names,
            sessions,
        })
    }

    /// Registered names, in registration order.
    ///
    /// Dynamically created sessions never show up here.
    #[must_use]
    pub fn model_names(&self) -> &[String] {
        &self.names
    }

    /// Pre-built session for a registered name, or a freshly constructed
    /// (and uncached) one for anything else.
    ///
    /// Construction failure propagates: an unknown model name is the
    /// caller's configuration mistake, not something to swallow here.
    pub fn get_or_create(&self, name: &str) -> Result<Arc<dyn InferenceSession>> {
        if let Some(session) = self.sessions.get(name) {
            return Ok(Arc::clone(session));
        }
        self.backend.create_session(name)
    }
}
