//! Schema table loader
//!
//! Starts from the documents embedded in this crate. When a schema
//! directory is configured, `<content-path>.schema.json` and
//! `generic.schema.json` files found there replace the embedded
//! documents one-for-one. Unrelated files are ignored.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::content::{ContentPath, GENERIC_DOCUMENT, GENERIC_SCHEMA_NAME};
use crate::json::JsonSchema;
use crate::model::PageSchema;
use crate::registry::SchemaRegistry;
use crate::{Error, Result};

/// Builds a [`SchemaRegistry`] from built-in and on-disk documents
#[derive(Debug, Default, Clone)]
pub struct SchemaLoader {
    schema_dir: Option<PathBuf>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `dir`
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(dir.into());
        self
    }

    /// Compile every schema and assemble the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the override directory cannot be read,
    /// [`Error::Parse`] for malformed JSON, and [`Error::InvalidSchema`] when
    /// a document does not compile.
    pub fn load(&self) -> Result<SchemaRegistry> {
        if let Some(dir) = &self.schema_dir {
            if !dir.is_dir() {
                return Err(Error::NotFound(dir.display().to_string()));
            }
        }

        let mut schemas = Vec::with_capacity(ContentPath::ALL.len());
        for path in ContentPath::ALL {
            let schema = self.compile(
                path.as_str(),
                &path.schema_file_name(),
                path.builtin_document(),
            )?;
            schemas.push((path, schema));
        }

        let generic = self.compile(
            GENERIC_SCHEMA_NAME,
            &format!("{GENERIC_SCHEMA_NAME}.schema.json"),
            GENERIC_DOCUMENT,
        )?;

        info!(schemas = schemas.len(), "schema registry loaded");
        Ok(SchemaRegistry::new(schemas, generic))
    }

    fn compile(&self, name: &str, file_name: &str, builtin: &str) -> Result<PageSchema> {
        let text = match self.override_file(file_name) {
            Some(path) => {
                debug!(schema = name, path = %path.display(), "loading schema override");
                std::fs::read_to_string(&path)?
            }
            None => builtin.to_string(),
        };

        Ok(Arc::new(JsonSchema::from_json_str(name, &text)?))
    }

    fn override_file(&self, file_name: &str) -> Option<PathBuf> {
        self.schema_dir
            .as_deref()
            .map(|dir: &Path| dir.join(file_name))
            .filter(|path| path.is_file())
    }
}
