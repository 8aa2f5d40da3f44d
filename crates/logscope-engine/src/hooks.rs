use std::sync::Arc;

use logscope_source::{FetchError, QueryError};
use logscope_types::LogRecord;

/// Why the session guard is being signalled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    /// No token was handed to the engine at start-up
    MissingToken,
    /// The stream source rejected the token
    Rejected(FetchError),
}

/// Redirects the operator to authentication; the engine never picks the destination
pub trait SessionGuard: Send + Sync {
    fn session_invalid(&self, signal: &SessionSignal);
}

/// Receives local, non-fatal failures
pub trait ErrorReporter: Send + Sync {
    fn query_failed(&self, error: &QueryError);

    /// Stream list could not be loaded for a reason other than authentication
    fn streams_unavailable(&self, _error: &FetchError) {}
}

/// Shows a single record; the engine only tracks whether it is open
pub trait DetailView: Send + Sync {
    fn open(&self, record: &LogRecord);
    fn close(&self);
}

/// The external collaborators an [`Explorer`](crate::Explorer) talks to
#[derive(Clone)]
pub struct Collaborators {
    pub session: Arc<dyn SessionGuard>,
    pub errors: Arc<dyn ErrorReporter>,
    pub detail: Arc<dyn DetailView>,
}

impl Collaborators {
    /// Use one value for every collaborator
    pub fn uniform<T>(hooks: Arc<T>) -> Self
    where
        T: SessionGuard + ErrorReporter + DetailView + 'static,
    {
        Self {
            session: hooks.clone(),
            errors: hooks.clone(),
            detail: hooks,
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::uniform(Arc::new(TracingHooks))
    }
}

/// Collaborators that only log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHooks;

impl SessionGuard for TracingHooks {
    fn session_invalid(&self, signal: &SessionSignal) {
        tracing::warn!(?signal, "session invalid, authentication required");
    }
}

impl ErrorReporter for TracingHooks {
    fn query_failed(&self, error: &QueryError) {
        tracing::warn!(%error, "query failed");
    }

    fn streams_unavailable(&self, error: &FetchError) {
        tracing::warn!(%error, "stream list unavailable");
    }
}

impl DetailView for TracingHooks {
    fn open(&self, record: &LogRecord) {
        tracing::info!(time = %record.time, body = %record.body, "detail opened");
    }

    fn close(&self) {
        tracing::debug!("detail closed");
    }
}
