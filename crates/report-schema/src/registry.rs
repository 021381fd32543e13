//! Content-path schema registry

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::content::ContentPath;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::loader::SchemaLoader;
use crate::model::PageSchema;

/// Immutable mapping from content path to schema, with a generic fallback.
///
/// Built once at startup. There is no way to add or remove entries after
/// construction, so a shared reference can be read from any thread.
pub struct SchemaRegistry {
    schemas: HashMap<ContentPath, PageSchema>,
    generic: PageSchema,
}

impl SchemaRegistry {
    /// Create a registry from explicit schema capabilities
    pub fn new(
        schemas: impl IntoIterator<Item = (ContentPath, PageSchema)>,
        generic: PageSchema,
    ) -> Self {
        Self {
            schemas: schemas.into_iter().collect(),
            generic,
        }
    }

    /// Compile the built-in schema table.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in schema document fails to compile.
    pub fn builtin() -> Result<Self> {
        SchemaLoader::new().load()
    }

    /// Compile the built-in table, replacing documents found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a schema file
    /// is malformed.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        SchemaLoader::new().with_dir(dir.as_ref()).load()
    }

    /// Exact lookup with no fallback
    pub fn get(&self, content_path: &str) -> Option<&PageSchema> {
        content_path
            .parse::<ContentPath>()
            .ok()
            .and_then(|path| self.schemas.get(&path))
    }

    /// Exact lookup by typed content path
    pub fn get_path(&self, content_path: ContentPath) -> Option<&PageSchema> {
        self.schemas.get(&content_path)
    }

    /// Resolve a content path, degrading to the generic schema.
    ///
    /// A miss is not an error: `sink` receives a
    /// [`Diagnostic::MissingSchema`] and the generic schema is returned.
    pub fn lookup(&self, content_path: &str, sink: &dyn DiagnosticSink) -> &PageSchema {
        if let Some(schema) = self.get(content_path) {
            debug!(content_path, schema = schema.name(), "resolved schema");
            return schema;
        }

        sink.emit(Diagnostic::MissingSchema {
            content_path: content_path.to_string(),
        });
        &self.generic
    }

    /// The fallback schema
    pub fn generic(&self) -> &PageSchema {
        &self.generic
    }

    /// Registered content paths, in declaration order
    pub fn content_paths(&self) -> Vec<ContentPath> {
        let mut paths: Vec<ContentPath> = self.schemas.keys().copied().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("content_paths", &self.content_paths())
            .field("generic", &self.generic.name())
            .finish()
    }
}
