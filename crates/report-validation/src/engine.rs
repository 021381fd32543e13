//! Validation engine
//!
//! Every schema invocation passes through [`validate`]. It never panics and
//! never returns `Err`: schema issues, schema malfunctions, and panics raised
//! inside a schema all come back as [`ValidationResult::Failure`]. The
//! strict and soft tiers are thin adapters over it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use report_schema::{
    Diagnostic, DiagnosticSink, Issue, PageSchema, Schema, SchemaFailure, SchemaRegistry,
    TracingSink,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::reporter::{
    UNKNOWN_VALIDATION_ERROR, describe_panic, failure_message, transform_failure_message,
};

/// Outcome of a validation: exactly one of a value or an error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult<T> {
    Success { value: T },
    Failure { error: ValidationError },
}

impl<T> ValidationResult<T> {
    pub fn success(value: T) -> Self {
        Self::Success { value }
    }

    pub fn failure(error: ValidationError) -> Self {
        Self::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The validated value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The error, if any
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.into_result().ok()
    }

    pub fn into_error(self) -> Option<ValidationError> {
        self.into_result().err()
    }

    /// Convert into a `Result` for use with `?`
    ///
    /// # Errors
    ///
    /// Returns the contained error for a failure.
    pub fn into_result(self) -> Result<T, ValidationError> {
        match self {
            Self::Success { value } => Ok(value),
            Self::Failure { error } => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            Self::Success { value } => ValidationResult::Success { value: f(value) },
            Self::Failure { error } => ValidationResult::Failure { error },
        }
    }
}

impl<T> From<ValidationResult<T>> for Result<T, ValidationError> {
    fn from(result: ValidationResult<T>) -> Self {
        result.into_result()
    }
}

/// Which stage produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The data does not match the schema
    Schema,
    /// The schema capability could not produce a verdict
    Unknown,
    /// A pipeline transformation failed
    Transform,
}

/// A failed validation with its issues and formatted summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable summary
    pub message: String,
    /// Issues in the order the schema reported them
    pub issues: Vec<Issue>,
    /// Caller-supplied label for where validation happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_path: Option<String>,
    pub kind: FailureKind,
    /// Original description of an unexpected failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ValidationError {
    /// Error for a schema that reported structured issues
    pub fn from_issues(issues: Vec<Issue>, context_path: Option<&str>) -> Self {
        Self {
            message: failure_message(context_path, &issues),
            issues,
            context_path: context_path.map(str::to_string),
            kind: FailureKind::Schema,
            cause: None,
        }
    }

    /// Error for a schema capability that malfunctioned.
    ///
    /// Carries one synthetic root issue; `cause` keeps the original
    /// description and is appended to the message.
    pub fn unknown(context_path: Option<&str>, cause: Option<String>) -> Self {
        let issues = vec![Issue::root(UNKNOWN_VALIDATION_ERROR)];
        let mut message = failure_message(context_path, &issues);
        if let Some(cause) = &cause {
            message.push_str(&format!(" ({cause})"));
        }

        Self {
            message,
            issues,
            context_path: context_path.map(str::to_string),
            kind: FailureKind::Unknown,
            cause,
        }
    }

    /// Error for a transformation step; there is no issue path to report
    pub fn transform(context_path: Option<&str>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            message: transform_failure_message(context_path, &description),
            issues: Vec::new(),
            context_path: context_path.map(str::to_string),
            kind: FailureKind::Transform,
            cause: Some(description),
        }
    }

    /// Message followed by at most `limit` issues, one per line
    pub fn summary(&self, limit: usize) -> String {
        let mut out = self.message.clone();
        for issue in self.issues.iter().take(limit) {
            out.push_str("\n  - ");
            out.push_str(&issue.to_string());
        }
        if self.issues.len() > limit {
            out.push_str(&format!("\n  ... and {} more", self.issues.len() - limit));
        }
        out
    }
}

/// Run `schema` against `data`, never panicking.
pub fn validate<S>(
    schema: &S,
    data: &Value,
    context_path: Option<&str>,
) -> ValidationResult<S::Output>
where
    S: Schema + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| schema.parse(data)));

    let result = match outcome {
        Ok(Ok(value)) => ValidationResult::success(value),
        Ok(Err(SchemaFailure::Issues(issues))) if !issues.is_empty() => {
            ValidationResult::failure(ValidationError::from_issues(issues, context_path))
        }
        Ok(Err(SchemaFailure::Issues(_))) => ValidationResult::failure(ValidationError::unknown(
            context_path,
            Some(format!("schema '{}' rejected the data without issues", schema.name())),
        )),
        Ok(Err(SchemaFailure::Malfunction(description))) => {
            ValidationResult::failure(ValidationError::unknown(context_path, Some(description)))
        }
        Err(payload) => ValidationResult::failure(ValidationError::unknown(
            context_path,
            describe_panic(payload.as_ref()),
        )),
    };

    debug!(
        schema = schema.name(),
        context_path = context_path.unwrap_or(""),
        success = result.is_success(),
        "validated"
    );

    result
}

/// Like [`validate`], turning a failure into `Err` for `?` propagation.
///
/// # Errors
///
/// Returns the [`ValidationError`] of a failed validation.
pub fn validate_strict<S>(
    schema: &S,
    data: &Value,
    context_path: Option<&str>,
) -> Result<S::Output, ValidationError>
where
    S: Schema + ?Sized,
{
    validate(schema, data, context_path).into_result()
}

/// Like [`validate`], reporting a failure to `sink` and returning `None`.
pub fn validate_soft<S>(
    schema: &S,
    data: &Value,
    context_path: Option<&str>,
    sink: &dyn DiagnosticSink,
) -> Option<S::Output>
where
    S: Schema + ?Sized,
{
    match validate(schema, data, context_path) {
        ValidationResult::Success { value } => Some(value),
        ValidationResult::Failure { error } => {
            sink.emit(Diagnostic::SoftValidationFailed {
                context_path: error.context_path,
                message: error.message,
            });
            None
        }
    }
}

/// Validation entry point bound to a registry and a diagnostic sink
#[derive(Clone)]
pub struct ValidationEngine {
    registry: Arc<SchemaRegistry>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ValidationEngine {
    /// Create an engine with an explicit diagnostic sink
    pub fn new(registry: Arc<SchemaRegistry>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { registry, sink }
    }

    /// Create an engine that reports diagnostics through `tracing`
    pub fn with_tracing(registry: Arc<SchemaRegistry>) -> Self {
        Self::new(registry, Arc::new(TracingSink))
    }

    /// Engine over the built-in schema table.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in schema fails to compile.
    pub fn builtin() -> crate::Result<Self> {
        Ok(Self::with_tracing(Arc::new(SchemaRegistry::builtin()?)))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn validate<S>(
        &self,
        schema: &S,
        data: &Value,
        context_path: Option<&str>,
    ) -> ValidationResult<S::Output>
    where
        S: Schema + ?Sized,
    {
        validate(schema, data, context_path)
    }

    /// # Errors
    ///
    /// Returns the [`ValidationError`] of a failed validation.
    pub fn validate_strict<S>(
        &self,
        schema: &S,
        data: &Value,
        context_path: Option<&str>,
    ) -> Result<S::Output, ValidationError>
    where
        S: Schema + ?Sized,
    {
        validate_strict(schema, data, context_path)
    }

    pub fn validate_soft<S>(
        &self,
        schema: &S,
        data: &Value,
        context_path: Option<&str>,
    ) -> Option<S::Output>
    where
        S: Schema + ?Sized,
    {
        validate_soft(schema, data, context_path, self.sink.as_ref())
    }

    /// Exact registry lookup, without generic fallback
    pub fn get_schema_for_path(&self, content_path: &str) -> Option<&PageSchema> {
        self.registry.get(content_path)
    }

    /// Resolve the schema for `content_path` and validate `data` with it.
    ///
    /// Unknown paths are validated against the generic schema after a
    /// missing-schema diagnostic; the content path doubles as context path.
    pub fn validate_by_path(&self, content_path: &str, data: &Value) -> ValidationResult<Value> {
        let schema = self.resolve(content_path);
        validate(schema.as_ref(), data, Some(content_path))
    }

    /// Registry lookup with generic fallback, reporting misses to the sink
    pub fn resolve(&self, content_path: &str) -> &PageSchema {
        self.registry.lookup(content_path, self.sink.as_ref())
    }
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
