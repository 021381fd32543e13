//! Non-fatal diagnostics emitted during lookup and soft validation

use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// An observation worth reporting that does not fail the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No dedicated schema exists; the generic schema was used
    MissingSchema { content_path: String },
    /// A soft validation swallowed a failure
    SoftValidationFailed {
        context_path: Option<String>,
        message: String,
    },
}

/// Destination for diagnostics.
///
/// Passed into the registry and the engine rather than reached through a
/// global, so callers decide where observations go.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` as warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::MissingSchema { content_path } => {
                warn!(
                    content_path = %content_path,
                    "no schema registered for content path, using generic schema"
                );
            }
            Diagnostic::SoftValidationFailed {
                context_path,
                message,
            } => {
                warn!(
                    context_path = context_path.as_deref().unwrap_or("<none>"),
                    "{message}"
                );
            }
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded diagnostics
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.recorded.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
