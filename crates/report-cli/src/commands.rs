//! Command implementations
//!
//! Each command returns an [`Outcome`] instead of printing, so the binary
//! decides where output goes and which exit code to use.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use report_pipeline::{BatchConfig, BatchRequest, BatchResult, BatchValidator};
use report_schema::SchemaRegistry;
use report_validation::{ValidationEngine, ValidationError, ValidationResult};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::{Error, Result};

/// Issues shown per failure in text output
const TEXT_ISSUE_LIMIT: usize = 5;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Rendered command output and whether the command succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

/// A `content-path=file` pair given to `batch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub content_path: String,
    pub file: PathBuf,
}

impl FromStr for BatchEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((content_path, file)) if !content_path.is_empty() && !file.is_empty() => {
                Ok(Self {
                    content_path: content_path.to_string(),
                    file: PathBuf::from(file),
                })
            }
            _ => Err(Error::InvalidEntry(s.to_string())),
        }
    }
}

/// Build the schema registry described by `config`.
///
/// # Errors
///
/// Returns an error if a schema fails to load or compile.
pub fn load_registry(config: &CliConfig) -> Result<SchemaRegistry> {
    let registry = match &config.schema_dir {
        Some(dir) => SchemaRegistry::from_dir(dir)?,
        None => SchemaRegistry::builtin()?,
    };
    Ok(registry)
}

/// Read and parse a JSON page document.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Document`]
/// if it is not valid JSON.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| Error::Document {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// `validate <CONTENT_PATH> <FILE>`
///
/// # Errors
///
/// Returns an error if the document cannot be read or output cannot be
/// rendered; validation failures are reported through the outcome.
pub fn validate_file(
    engine: &ValidationEngine,
    content_path: &str,
    file: &Path,
    format: OutputFormat,
) -> Result<Outcome> {
    let data = read_document(file)?;
    let result = engine.validate_by_path(content_path, &data);
    info!(content_path, file = %file.display(), success = result.is_success(), "validated file");

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Text => render_text(content_path, file, &result),
    };

    Ok(Outcome {
        output,
        success: result.is_success(),
    })
}

/// `batch <CONTENT_PATH=FILE>...`
///
/// A document that cannot be read or parsed fails its own entry; the other
/// entries are still validated and reported.
///
/// # Errors
///
/// Returns an error if output cannot be rendered.
pub async fn validate_files(
    engine: &ValidationEngine,
    entries: &[BatchEntry],
    max_concurrency: usize,
    format: OutputFormat,
) -> Result<Outcome> {
    let mut unreadable = Vec::with_capacity(entries.len());
    let mut requests = Vec::with_capacity(entries.len());
    for entry in entries {
        match read_document(&entry.file) {
            Ok(data) => {
                let schema = engine.resolve(&entry.content_path).clone();
                requests
                    .push(BatchRequest::new(schema, data).with_context(entry.content_path.clone()));
                unreadable.push(None);
            }
            Err(e) => {
                warn!(content_path = %entry.content_path, error = %e, "skipping unreadable document");
                unreadable.push(Some(ValidationError::unknown(
                    Some(entry.content_path.as_str()),
                    Some(e.to_string()),
                )));
            }
        }
    }

    let validator = BatchValidator::new(BatchConfig { max_concurrency });
    let mut validated = validator.run_concurrent(requests).await.results.into_iter();

    let mut results = Vec::with_capacity(entries.len());
    for slot in unreadable {
        let result = match slot {
            Some(error) => ValidationResult::failure(error),
            None => match validated.next() {
                Some(result) => result,
                None => break,
            },
        };
        results.push(result);
    }
    let batch = BatchResult::from_results(results);

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&batch)?,
        OutputFormat::Text => {
            let mut lines: Vec<String> = entries
                .iter()
                .zip(&batch.results)
                .map(|(entry, result)| render_text(&entry.content_path, &entry.file, result))
                .collect();
            lines.push(format!("{} of {} valid", batch.passed_count(), batch.len()));
            lines.join("\n")
        }
    };

    Ok(Outcome {
        output,
        success: batch.all_valid,
    })
}

/// `schemas`
///
/// # Errors
///
/// Returns an error if JSON output cannot be rendered.
pub fn list_schemas(registry: &SchemaRegistry, format: OutputFormat) -> Result<Outcome> {
    let paths: Vec<&str> = registry
        .content_paths()
        .into_iter()
        .map(|path| path.as_str())
        .collect();

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&paths)?,
        OutputFormat::Text => paths.join("\n"),
    };

    Ok(Outcome {
        output,
        success: true,
    })
}

fn render_text(content_path: &str, file: &Path, result: &ValidationResult<Value>) -> String {
    match result {
        ValidationResult::Success { .. } => {
            format!("ok: {content_path} ({})", file.display())
        }
        ValidationResult::Failure { error } => {
            format!("FAIL: {}", error.summary(TEXT_ISSUE_LIMIT))
        }
    }
}
