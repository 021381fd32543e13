#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # report-validation
//!
//! Validation engine for report page documents.
//!
//! All schema invocations go through one engine so that results have a
//! single shape ([`ValidationResult`]) and failures a single message format.
//! Three access tiers sit on top of it:
//!
//! - [`validate_data`] returns a result to branch on,
//! - [`safe_validate`] returns `Err` for `?` propagation,
//! - [`soft_validate`] logs the failure and returns `None`.
//!
//! ## Example Usage
//!
//! ```rust
//! use report_schema::SchemaRegistry;
//! use report_validation::{get_schema_for_path, validate_data};
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::builtin().unwrap();
//! let schema = get_schema_for_path(&registry, "dashboard").unwrap();
//!
//! let result = validate_data(schema.as_ref(), &json!({"title": "Dashboard"}), Some("dashboard"));
//! assert_eq!(
//!     result.error().unwrap().message,
//!     "Validation failed for dashboard: Required at metrics"
//! );
//! ```

pub mod engine;
pub mod reporter;

pub use engine::{FailureKind, ValidationEngine, ValidationError, ValidationResult};
pub use reporter::{UNKNOWN_VALIDATION_ERROR, failure_message, format_issues};

use report_schema::{PageSchema, Schema, SchemaRegistry, TracingSink};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while setting up validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] report_schema::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Validate `data` against `schema`, returning a result value
pub fn validate_data<S>(
    schema: &S,
    data: &Value,
    context_path: Option<&str>,
) -> ValidationResult<S::Output>
where
    S: Schema + ?Sized,
{
    engine::validate(schema, data, context_path)
}

/// Validate `data`, returning `Err` on failure.
///
/// # Errors
///
/// Returns the [`ValidationError`] describing every issue found.
pub fn safe_validate<S>(
    schema: &S,
    data: &Value,
    context_path: Option<&str>,
) -> std::result::Result<S::Output, ValidationError>
where
    S: Schema + ?Sized,
{
    engine::validate_strict(schema, data, context_path)
}

/// Validate `data`, logging a failure through `tracing` and returning `None`
pub fn soft_validate<S>(schema: &S, data: &Value, context_path: Option<&str>) -> Option<S::Output>
where
    S: Schema + ?Sized,
{
    engine::validate_soft(schema, data, context_path, &TracingSink)
}

/// Exact schema lookup; `None` for paths without a dedicated schema
pub fn get_schema_for_path<'a>(
    registry: &'a SchemaRegistry,
    content_path: &str,
) -> Option<&'a PageSchema> {
    registry.get(content_path)
}

/// Validate a page document by content path, falling back to the generic
/// schema (with a logged warning) for unknown paths
pub fn validate_data_by_path(
    registry: &SchemaRegistry,
    content_path: &str,
    data: &Value,
) -> ValidationResult<Value> {
    let schema = registry.lookup(content_path, &TracingSink);
    engine::validate(schema.as_ref(), data, Some(content_path))
}
