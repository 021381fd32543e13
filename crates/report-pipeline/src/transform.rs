//! Transform-then-validate pipeline
//!
//! Three stages, each reported with its own context:
//!
//! 1. the input is validated under `<ctx>.input`,
//! 2. the transformation runs on the validated value,
//! 3. its output is validated under `<ctx>.output`.
//!
//! An input failure is returned as-is and the transformation never runs.
//! A transformation failure carries no issues, since it happens outside
//! any schema.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use report_schema::Schema;
use report_validation::engine::validate;
use report_validation::reporter::describe_panic;
use report_validation::{ValidationError, ValidationResult};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Context suffix for the input stage
pub const INPUT_SUFFIX: &str = ".input";
/// Context suffix for the output stage
pub const OUTPUT_SUFFIX: &str = ".output";

/// A reusable input schema, transformation, and output schema
#[derive(Debug, Clone)]
pub struct TransformPipeline<I, O, F> {
    input: I,
    output: O,
    transform: F,
}

impl<I, O, F> TransformPipeline<I, O, F>
where
    I: Schema,
    O: Schema,
{
    pub fn new(input: I, output: O, transform: F) -> Self {
        Self {
            input,
            output,
            transform,
        }
    }

    /// Run all three stages on `data`
    pub fn run<M, E>(&self, data: &Value, context_path: Option<&str>) -> ValidationResult<O::Output>
    where
        F: Fn(I::Output) -> Result<M, E>,
        M: Serialize,
        E: Display,
    {
        transform_and_validate(&self.input, &self.output, &self.transform, data, context_path)
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

/// Validate `data`, transform it, and validate the result.
///
/// A `Success` means the input satisfied `input` and the produced value
/// satisfies `output`. A transformation that returns `Err`, panics, or
/// yields a value that cannot be represented as JSON produces a
/// [`FailureKind::Transform`](report_validation::FailureKind::Transform)
/// failure.
pub fn transform_and_validate<I, O, F, M, E>(
    input: &I,
    output: &O,
    transform: F,
    data: &Value,
    context_path: Option<&str>,
) -> ValidationResult<O::Output>
where
    I: Schema + ?Sized,
    O: Schema + ?Sized,
    F: FnOnce(I::Output) -> Result<M, E>,
    M: Serialize,
    E: Display,
{
    let input_context = stage_context(context_path, INPUT_SUFFIX);
    let value = match validate(input, data, Some(&input_context)) {
        ValidationResult::Success { value } => value,
        ValidationResult::Failure { error } => return ValidationResult::Failure { error },
    };

    let transformed = match panic::catch_unwind(AssertUnwindSafe(|| transform(value))) {
        Ok(Ok(transformed)) => transformed,
        Ok(Err(e)) => return transform_failure(context_path, e.to_string()),
        Err(payload) => {
            let description = describe_panic(payload.as_ref())
                .unwrap_or_else(|| "transformation panicked".to_string());
            return transform_failure(context_path, description);
        }
    };

    let transformed = match serde_json::to_value(&transformed) {
        Ok(transformed) => transformed,
        Err(e) => {
            return transform_failure(
                context_path,
                format!("output is not representable as JSON: {e}"),
            );
        }
    };

    let output_context = stage_context(context_path, OUTPUT_SUFFIX);
    validate(output, &transformed, Some(&output_context))
}

fn stage_context(context_path: Option<&str>, suffix: &str) -> String {
    format!("{}{suffix}", context_path.unwrap_or_default())
}

fn transform_failure<T>(context_path: Option<&str>, description: String) -> ValidationResult<T> {
    debug!(
        context_path = context_path.unwrap_or(""),
        description = %description,
        "transformation failed"
    );
    ValidationResult::failure(ValidationError::transform(context_path, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_schema::{Issue, SchemaFailure, schema_fn};
    use report_validation::FailureKind;
    use serde_json::json;
    use std::cell::Cell;

    fn numbers() -> impl Schema<Output = Vec<f64>> {
        schema_fn("numbers", |data: &Value| {
            let items = data
                .as_array()
                .ok_or_else(|| SchemaFailure::issue(Issue::root("Expected array")))?;
            let mut values = Vec::with_capacity(items.len());
            let mut issues = Vec::new();
            for (index, item) in items.iter().enumerate() {
                match item.as_f64() {
                    Some(n) => values.push(n),
                    None => issues.push(Issue::new(vec![index.into()], "Expected number")),
                }
            }
            if issues.is_empty() {
                Ok(values)
            } else {
                Err(SchemaFailure::Issues(issues))
            }
        })
    }

    fn total() -> impl Schema<Output = f64> {
        schema_fn("total", |data: &Value| match data.get("total").and_then(Value::as_f64) {
            Some(total) if total >= 0.0 => Ok(total),
            Some(_) => Err(SchemaFailure::issue(Issue::new(
                vec!["total".into()],
                "Must be non-negative",
            ))),
            None => Err(SchemaFailure::issue(Issue::new(vec!["total".into()], "Required"))),
        })
    }

    fn sum(values: Vec<f64>) -> Result<Value, String> {
        Ok(json!({"total": values.iter().sum::<f64>()}))
    }

    #[test]
    fn test_all_stages_pass() {
        let result =
            transform_and_validate(&numbers(), &total(), sum, &json!([1, 2, 3.5]), Some("model"));
        assert_eq!(result.into_value(), Some(6.5));
    }

    #[test]
    fn test_input_failure_skips_transform() {
        let called = Cell::new(false);
        let result = transform_and_validate(
            &numbers(),
            &total(),
            |values| {
                called.set(true);
                sum(values)
            },
            &json!([1, "two"]),
            Some("model"),
        );

        let error = result.into_error().unwrap();
        assert!(!called.get());
        assert_eq!(error.context_path.as_deref(), Some("model.input"));
        assert_eq!(error.message, "Validation failed for model.input: Expected number at [1]");
    }

    #[test]
    fn test_transform_error_is_reported_without_issues() {
        let result = transform_and_validate(
            &numbers(),
            &total(),
            |_| Err::<Value, _>("division by zero"),
            &json!([1]),
            Some("model"),
        );

        let error = result.into_error().unwrap();
        assert_eq!(error.kind, FailureKind::Transform);
        assert_eq!(error.message, "Transformation failed for model: division by zero");
        assert!(error.issues.is_empty());
        assert_eq!(error.context_path.as_deref(), Some("model"));
    }

    #[test]
    fn test_transform_panic_is_contained() {
        let result = transform_and_validate(
            &numbers(),
            &total(),
            |_: Vec<f64>| -> Result<Value, String> { panic!("unexpected shape") },
            &json!([]),
            None,
        );

        let error = result.into_error().unwrap();
        assert_eq!(error.message, "Transformation failed: unexpected shape");
    }

    #[test]
    fn test_output_failure_uses_output_context() {
        let result = transform_and_validate(
            &numbers(),
            &total(),
            |_| Ok::<_, String>(json!({"total": -1})),
            &json!([1]),
            Some("model"),
        );

        let error = result.into_error().unwrap();
        assert_eq!(error.context_path.as_deref(), Some("model.output"));
        assert_eq!(error.issues[0].locator(), "total");
    }

    #[test]
    fn test_missing_context_uses_bare_suffix() {
        let result = transform_and_validate(&numbers(), &total(), sum, &json!("x"), None);
        assert_eq!(result.into_error().unwrap().context_path.as_deref(), Some(".input"));
    }

    #[test]
    fn test_pipeline_is_reusable() {
        let pipeline = TransformPipeline::new(numbers(), total(), sum);

        assert_eq!(pipeline.run(&json!([1, 1]), Some("a")).into_value(), Some(2.0));
        assert_eq!(pipeline.run(&json!([4]), Some("b")).into_value(), Some(4.0));
        assert!(pipeline.run(&json!({}), Some("c")).is_failure());
        assert_eq!(pipeline.input().name(), "numbers");
        assert_eq!(pipeline.output().name(), "total");
    }
}
