//! JSON Schema backed page schemas
//!
//! Documents are checked against a compiled Draft 2020-12 schema. Every
//! error the validator yields becomes one [`Issue`], in validator order.
//! JSON Pointer instance paths are converted into [`PathSegment`]s by
//! walking the checked document, so `"/metrics/0"` resolves to an index
//! only when `metrics` is really an array.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError, Validator};
use serde_json::Value;
use tracing::trace;

use crate::issue::{Issue, PathSegment};
use crate::model::{Schema, SchemaFailure};
use crate::{Error, Result};

/// A compiled JSON Schema document
pub struct JsonSchema {
    name: String,
    validator: Validator,
}

impl JsonSchema {
    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] when the document is not a valid
    /// Draft 2020-12 schema.
    pub fn compile(name: impl Into<String>, document: &Value) -> Result<Self> {
        let name = name.into();
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(document)
            .map_err(|e| Error::InvalidSchema {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        trace!(schema = %name, "compiled json schema");

        Ok(Self { name, validator })
    }

    /// Parse schema text and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and [`Error::InvalidSchema`]
    /// when compilation fails.
    pub fn from_json_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let document: Value = serde_json::from_str(text)
            .map_err(|e| Error::Parse(format!("schema '{name}': {e}")))?;
        Self::compile(name, &document)
    }
}

impl Schema for JsonSchema {
    type Output = Value;

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, data: &Value) -> std::result::Result<Value, SchemaFailure> {
        let issues: Vec<Issue> = self
            .validator
            .iter_errors(data)
            .map(|error| issue_from_error(data, &error))
            .collect();

        if issues.is_empty() {
            Ok(data.clone())
        } else {
            Err(SchemaFailure::Issues(issues))
        }
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn issue_from_error(instance: &Value, error: &ValidationError<'_>) -> Issue {
    let mut path = pointer_segments(instance, &error.instance_path.to_string());

    match &error.kind {
        // The validator reports a missing member at its parent object.
        ValidationErrorKind::Required { property } => {
            let key = property
                .as_str()
                .map_or_else(|| property.to_string(), str::to_string);
            path.push(PathSegment::Key(key));
            Issue::new(path, "Required")
        }
        _ => Issue::new(path, error.to_string()),
    }
}

/// Convert a JSON Pointer into segments, using the instance to tell array
/// indices apart from numeric object keys.
pub(crate) fn pointer_segments(instance: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = Some(instance);

    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        let segment = match current {
            Some(Value::Array(items)) => match token.parse::<usize>() {
                Ok(index) => {
                    current = items.get(index);
                    PathSegment::Index(index)
                }
                Err(_) => {
                    current = None;
                    PathSegment::Key(token)
                }
            },
            Some(Value::Object(map)) => {
                current = map.get(&token);
                PathSegment::Key(token)
            }
            _ => {
                current = None;
                PathSegment::Key(token)
            }
        };
        segments.push(segment);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headline_schema() -> JsonSchema {
        JsonSchema::compile(
            "headline",
            &json!({
                "type": "object",
                "required": ["title", "metrics"],
                "properties": {
                    "title": { "type": "string" },
                    "metrics": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["label"],
                            "properties": { "label": { "type": "string" } }
                        }
                    }
                }
            }),
        )
        .unwrap()
    }

    fn issues_of(result: std::result::Result<Value, SchemaFailure>) -> Vec<Issue> {
        match result {
            Err(SchemaFailure::Issues(issues)) => issues,
            other => panic!("expected issues, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_and_returns_input() {
        let data = json!({"title": "Dashboard", "metrics": []});
        assert_eq!(headline_schema().parse(&data).unwrap(), data);
    }

    #[test]
    fn test_missing_member_points_at_member() {
        let issues = issues_of(headline_schema().parse(&json!({"title": "Dashboard"})));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].locator(), "metrics");
        assert_eq!(issues[0].message, "Required");
    }

    #[test]
    fn test_nested_issue_uses_array_index() {
        let data = json!({"title": "Dashboard", "metrics": [{"label": "ARR"}, {"label": 4}]});
        let issues = issues_of(headline_schema().parse(&data));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["metrics".into(), 1.into(), "label".into()]);
    }

    #[test]
    fn test_missing_member_inside_array_item() {
        let data = json!({"title": "Dashboard", "metrics": [{}]});
        let issues = issues_of(headline_schema().parse(&data));
        assert_eq!(issues[0].locator(), "metrics[0].label");
    }

    #[test]
    fn test_pointer_keeps_numeric_object_keys() {
        let data = json!({"2024": {"revenue": 1}});
        let segments = pointer_segments(&data, "/2024/revenue");
        assert_eq!(segments, vec!["2024".into(), "revenue".into()]);
    }

    #[test]
    fn test_pointer_unescapes_tokens() {
        let data = json!({"a/b": {"c~d": 1}});
        let segments = pointer_segments(&data, "/a~1b/c~0d");
        assert_eq!(segments, vec!["a/b".into(), "c~d".into()]);
    }

    #[test]
    fn test_root_pointer_is_empty() {
        assert!(pointer_segments(&json!({}), "").is_empty());
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let result = JsonSchema::compile("broken", &json!({"type": 12}));
        assert!(matches!(result, Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_malformed_schema_text() {
        let result = JsonSchema::from_json_str("broken", "{ not json");
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
