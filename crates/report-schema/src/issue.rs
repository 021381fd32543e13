//! Validation issues and their locator paths

use std::fmt;

use serde::Serialize;

/// One step into a document: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object member name
    Key(String),
    /// Zero-based array position
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single defect reported by a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Segments leading from the document root to the offending value
    pub path: Vec<PathSegment>,
    /// Human-readable description of the defect
    pub message: String,
}

impl Issue {
    /// Create an issue at the given path
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Create an issue attached to the document root
    pub fn root(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message)
    }

    /// Render the path as `metrics[0].label`.
    ///
    /// Keys are joined with `.`, indices are rendered as `[i]`. Keys that are
    /// empty or contain `.`, `[`, `]` or `"` are quoted: `rows["a.b"]`. An
    /// empty path renders as the empty string.
    pub fn locator(&self) -> String {
        render_locator(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at {}", self.message, self.locator())
        }
    }
}

/// Render a segment sequence as a dotted/bracketed locator
pub fn render_locator(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) if needs_quoting(key) => {
                out.push_str("[\"");
                out.push_str(&key.replace('\\', "\\\\").replace('"', "\\\""));
                out.push_str("\"]");
            }
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_mixes_keys_and_indices() {
        let issue = Issue::new(
            vec!["metrics".into(), 0.into(), "label".into()],
            "Expected string",
        );
        assert_eq!(issue.locator(), "metrics[0].label");
    }

    #[test]
    fn test_locator_with_leading_index() {
        let issue = Issue::new(vec![2.into(), "title".into()], "Required");
        assert_eq!(issue.locator(), "[2].title");
    }

    #[test]
    fn test_locator_quotes_ambiguous_keys() {
        let dotted = Issue::new(vec!["a.b".into()], "bad");
        let nested = Issue::new(vec!["a".into(), "b".into()], "bad");
        assert_eq!(dotted.locator(), r#"["a.b"]"#);
        assert_eq!(nested.locator(), "a.b");
        assert_ne!(dotted.locator(), nested.locator());

        let empty = Issue::new(vec!["".into(), "a".into()], "bad");
        assert_eq!(empty.locator(), r#"[""].a"#);

        let inner = Issue::new(vec!["rows".into(), 0.into(), r#"say "hi""#.into()], "bad");
        assert_eq!(inner.locator(), r#"rows[0]["say \"hi\""]"#);
    }

    #[test]
    fn test_display_omits_locator_for_root_issue() {
        assert_eq!(Issue::root("Expected object").to_string(), "Expected object");
        let nested = Issue::new(vec!["metrics".into()], "Required");
        assert_eq!(nested.to_string(), "Required at metrics");
    }

    #[test]
    fn test_segments_serialize_untagged() {
        let issue = Issue::new(vec!["rows".into(), 3.into()], "bad");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], serde_json::json!(["rows", 3]));
    }
}
