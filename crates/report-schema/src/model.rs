//! Schema capability model

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::issue::{Issue, PathSegment};

/// Why a schema refused a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaFailure {
    /// Structured defects, in the order the schema discovered them
    Issues(Vec<Issue>),
    /// The schema itself could not produce a verdict
    Malfunction(String),
}

impl SchemaFailure {
    /// Shorthand for a failure with a single issue
    pub fn issue(issue: Issue) -> Self {
        Self::Issues(vec![issue])
    }
}

impl From<Vec<Issue>> for SchemaFailure {
    fn from(issues: Vec<Issue>) -> Self {
        Self::Issues(issues)
    }
}

/// A parse capability: raw JSON in, typed value or issues out.
///
/// Implementations must be deterministic and free of side effects; the
/// validation engine may call them from any thread.
pub trait Schema: Send + Sync {
    /// Value produced for an accepted document
    type Output;

    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Check `data` and produce the typed value
    fn parse(&self, data: &Value) -> Result<Self::Output, SchemaFailure>;
}

impl<S: Schema + ?Sized> Schema for &S {
    type Output = S::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn parse(&self, data: &Value) -> Result<Self::Output, SchemaFailure> {
        (**self).parse(data)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    type Output = S::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn parse(&self, data: &Value) -> Result<Self::Output, SchemaFailure> {
        (**self).parse(data)
    }
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    type Output = S::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn parse(&self, data: &Value) -> Result<Self::Output, SchemaFailure> {
        (**self).parse(data)
    }
}

/// Shared handle to a schema producing raw page documents
pub type PageSchema = Arc<dyn Schema<Output = Value>>;

/// A schema backed by a closure
pub struct SchemaFn<F> {
    name: String,
    parse: F,
}

/// Build a schema from a closure
pub fn schema_fn<T, F>(name: impl Into<String>, parse: F) -> SchemaFn<F>
where
    F: Fn(&Value) -> Result<T, SchemaFailure> + Send + Sync,
{
    SchemaFn {
        name: name.into(),
        parse,
    }
}

impl<T, F> Schema for SchemaFn<F>
where
    F: Fn(&Value) -> Result<T, SchemaFailure> + Send + Sync,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, data: &Value) -> Result<T, SchemaFailure> {
        (self.parse)(data)
    }
}

impl<F> fmt::Debug for SchemaFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaFn").field("name", &self.name).finish()
    }
}

/// Structural check followed by deserialization into `T`
pub struct Typed<S, T> {
    inner: S,
    _output: PhantomData<fn() -> T>,
}

impl<S, T> Typed<S, T>
where
    S: Schema<Output = Value>,
    T: DeserializeOwned,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            _output: PhantomData,
        }
    }
}

impl<S, T> Schema for Typed<S, T>
where
    S: Schema<Output = Value>,
    T: DeserializeOwned,
{
    type Output = T;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn parse(&self, data: &Value) -> Result<T, SchemaFailure> {
        let checked = self.inner.parse(data)?;
        serde_path_to_error::deserialize(checked).map_err(|e| {
            let path = e.path().iter().filter_map(path_segment).collect();
            SchemaFailure::issue(Issue::new(path, e.inner().to_string()))
        })
    }
}

fn path_segment(segment: &Segment) -> Option<PathSegment> {
    match segment {
        Segment::Seq { index } => Some(PathSegment::Index(*index)),
        Segment::Map { key } => Some(PathSegment::Key(key.clone())),
        _ => None,
    }
}

impl<S: fmt::Debug, T> fmt::Debug for Typed<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed").field("inner", &self.inner).finish()
    }
}
