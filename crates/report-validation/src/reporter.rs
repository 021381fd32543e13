//! Human-readable failure messages
//!
//! Every message produced by the engine and the pipeline goes through the
//! functions in this module, so the wording is defined in one place.

use std::any::Any;

use report_schema::Issue;

/// Message of the synthetic issue used when a schema cannot give a verdict
pub const UNKNOWN_VALIDATION_ERROR: &str = "Unknown validation error";

/// Join issues as `"<message> at <locator>"`, separated by `", "`.
///
/// Issues with an empty path render as the bare message.
pub fn format_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"Validation failed[ for <ctx>]: <issues>"`
pub fn failure_message(context_path: Option<&str>, issues: &[Issue]) -> String {
    format!(
        "Validation failed{}: {}",
        for_context(context_path),
        format_issues(issues)
    )
}

/// `"Transformation failed[ for <ctx>]: <description>"`
pub fn transform_failure_message(context_path: Option<&str>, description: &str) -> String {
    format!(
        "Transformation failed{}: {description}",
        for_context(context_path)
    )
}

/// Best-effort description of a caught panic payload
pub fn describe_panic(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

fn for_context(context_path: Option<&str>) -> String {
    context_path.map_or_else(String::new, |ctx| format!(" for {ctx}"))
}
