//! # report-schema
//!
//! Issue model, schema capabilities, and the content-path registry for
//! investor report pages.
//!
//! A schema is anything implementing [`Schema`]: raw JSON in, a typed value
//! or an ordered list of [`Issue`]s out. Page schemas ship as JSON Schema
//! documents compiled with the `jsonschema` crate and are resolved through
//! the [`SchemaRegistry`] by content path (`"dashboard"`, `"financial-model"`,
//! ...), falling back to a permissive generic schema for unknown pages.

pub mod content;
pub mod diagnostics;
pub mod issue;
pub mod json;
pub mod loader;
pub mod model;
pub mod registry;

pub use content::{ContentPath, GENERIC_SCHEMA_NAME};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use issue::{Issue, PathSegment, render_locator};
pub use json::JsonSchema;
pub use loader::SchemaLoader;
pub use model::{PageSchema, Schema, SchemaFailure, SchemaFn, Typed, schema_fn};
pub use registry::SchemaRegistry;

use thiserror::Error;

/// Errors that can occur when building schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Unknown content path: {0}")]
    UnknownContentPath(String),

    #[error("Invalid schema '{name}': {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
