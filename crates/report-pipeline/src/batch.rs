//! Batch validation
//!
//! Runs an ordered set of independent validations and reports on all of
//! them. Nothing short-circuits: every request is evaluated exactly once,
//! and results line up 1:1 with the requests regardless of the order in
//! which they finished.

use std::fmt;
use std::sync::Arc;

use report_schema::Schema;
use report_validation::engine::validate;
use report_validation::{ValidationError, ValidationResult};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// One validation to run as part of a batch
pub struct BatchRequest<T> {
    /// Schema to validate against
    pub schema: Arc<dyn Schema<Output = T>>,
    /// Document to validate
    pub data: Value,
    /// Context label for error messages
    pub context_path: Option<String>,
}

impl<T> BatchRequest<T> {
    pub fn new(schema: Arc<dyn Schema<Output = T>>, data: Value) -> Self {
        Self {
            schema,
            data,
            context_path: None,
        }
    }

    /// Attach a context label
    pub fn with_context(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = Some(context_path.into());
        self
    }

    fn evaluate(&self) -> ValidationResult<T> {
        validate(self.schema.as_ref(), &self.data, self.context_path.as_deref())
    }
}

impl<T> Clone for BatchRequest<T> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            data: self.data.clone(),
            context_path: self.context_path.clone(),
        }
    }
}

impl<T> fmt::Debug for BatchRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRequest")
            .field("schema", &self.schema.name())
            .field("context_path", &self.context_path)
            .finish_non_exhaustive()
    }
}

/// Aggregated outcome of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<T> {
    /// One result per request, in request order
    pub results: Vec<ValidationResult<T>>,
    /// `true` iff every result is a success
    pub all_valid: bool,
    /// Errors of the failing results, in request order
    pub errors: Vec<ValidationError>,
}

impl<T> BatchResult<T> {
    /// Aggregate positional results
    pub fn from_results(results: Vec<ValidationResult<T>>) -> Self {
        let errors: Vec<ValidationError> = results
            .iter()
            .filter_map(ValidationResult::error)
            .cloned()
            .collect();

        Self {
            all_valid: errors.is_empty(),
            results,
            errors,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.len() - self.errors.len()
    }
}

/// Configuration for batch validation
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Upper bound on validations running at once in concurrent mode
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
        }
    }
}

/// Evaluates batches of independent validation requests
#[derive(Debug, Clone, Default)]
pub struct BatchValidator {
    config: BatchConfig,
}

impl BatchValidator {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Evaluate every request on the calling thread
    pub fn run<T>(&self, requests: &[BatchRequest<T>]) -> BatchResult<T> {
        let results = requests.iter().map(BatchRequest::evaluate).collect();
        let batch = BatchResult::from_results(results);
        debug!(
            requests = batch.len(),
            failed = batch.failed_count(),
            "batch validated"
        );
        batch
    }

    /// Evaluate requests on the blocking thread pool.
    ///
    /// At most `max_concurrency` validations run at once. A task that is
    /// lost (cancelled or panicked outside the engine) fails only its own
    /// position, with an unknown validation error.
    pub async fn run_concurrent<T>(&self, requests: Vec<BatchRequest<T>>) -> BatchResult<T>
    where
        T: Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut pending = Vec::with_capacity(requests.len());

        for request in requests {
            let context_path = request.context_path.clone();
            let permit = Arc::clone(&semaphore).acquire_owned().await;
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                request.evaluate()
            });
            pending.push((context_path, handle));
        }

        let mut results = Vec::with_capacity(pending.len());
        for (context_path, handle) in pending {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => lost_task(context_path.as_deref(), &e),
            };
            results.push(result);
        }

        let batch = BatchResult::from_results(results);
        debug!(
            requests = batch.len(),
            failed = batch.failed_count(),
            "concurrent batch validated"
        );
        batch
    }
}

/// Failure for a request whose blocking task never produced a result
fn lost_task<T>(context_path: Option<&str>, error: &JoinError) -> ValidationResult<T> {
    warn!(
        context_path = context_path.unwrap_or(""),
        error = %error,
        "batch validation task was lost"
    );
    ValidationResult::failure(ValidationError::unknown(
        context_path,
        Some(error.to_string()),
    ))
}

/// Evaluate `requests` sequentially with the default validator
pub fn validate_batch<T>(requests: &[BatchRequest<T>]) -> BatchResult<T> {
    BatchValidator::with_defaults().run(requests)
}
