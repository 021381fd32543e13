//! End-to-end tests: page documents through the built-in registry,
//! transform pipelines, and batches.

use std::sync::Arc;

use report_pipeline::{
    BatchRequest, BatchValidator, TransformPipeline, transform_and_validate, validate_batch,
};
use report_schema::{PageSchema, SchemaRegistry};
use report_validation::FailureKind;
use serde::Serialize;
use serde_json::{Value, json};

fn registry() -> SchemaRegistry {
    SchemaRegistry::builtin().expect("built-in schemas should compile")
}

fn schema(registry: &SchemaRegistry, content_path: &str) -> PageSchema {
    Arc::clone(registry.get(content_path).expect("registered schema"))
}

fn financial_model() -> Value {
    json!({
        "title": "Five-year plan",
        "currency": "USD",
        "periods": ["2026", "2027"],
        "lineItems": [
            {"name": "Subscriptions", "category": "revenue", "values": [1200.0, 2400.0]},
            {"name": "Services", "category": "revenue", "values": [300.0, 350.0]},
            {"name": "Payroll", "category": "opex", "values": [900.0, 1100.0]}
        ]
    })
}

#[derive(Serialize)]
struct Metric {
    label: String,
    value: f64,
    unit: String,
}

#[derive(Serialize)]
struct Dashboard {
    title: String,
    metrics: Vec<Metric>,
}

/// Summarise the last period's revenue into a dashboard page
fn revenue_dashboard(model: Value) -> Result<Dashboard, String> {
    let currency = model["currency"].as_str().unwrap_or("USD").to_string();
    let items = model["lineItems"].as_array().ok_or("lineItems missing")?;

    let mut revenue = 0.0;
    for item in items.iter().filter(|i| i["category"] == "revenue") {
        let last = item["values"]
            .as_array()
            .and_then(|values| values.last())
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("no values for {}", item["name"]))?;
        revenue += last;
    }

    Ok(Dashboard {
        title: format!("{} overview", model["title"].as_str().unwrap_or_default()),
        metrics: vec![Metric {
            label: "Revenue".to_string(),
            value: revenue,
            unit: currency,
        }],
    })
}

#[test]
fn financial_model_becomes_valid_dashboard() {
    let registry = registry();
    let pipeline = TransformPipeline::new(
        schema(&registry, "financial-model"),
        schema(&registry, "dashboard"),
        revenue_dashboard,
    );

    let dashboard = pipeline
        .run(&financial_model(), Some("financial-model"))
        .into_value()
        .expect("pipeline should succeed");

    assert_eq!(dashboard["title"], "Five-year plan overview");
    assert_eq!(dashboard["metrics"][0]["value"], 2750.0);

    let revalidated =
        validate_batch(&[BatchRequest::new(schema(&registry, "dashboard"), dashboard)]);
    assert!(revalidated.all_valid);
}

#[test]
fn invalid_model_never_reaches_transform() {
    let registry = registry();
    let mut model = financial_model();
    model["currency"] = json!("dollars");

    let error = transform_and_validate(
        schema(&registry, "financial-model").as_ref(),
        schema(&registry, "dashboard").as_ref(),
        |_: Value| -> Result<Value, String> { panic!("transform must not run") },
        &model,
        Some("financial-model"),
    )
    .into_error()
    .expect("input should be rejected");

    assert!(error.context_path.as_deref().unwrap().ends_with(".input"));
    assert_eq!(error.issues[0].locator(), "currency");
}

#[test]
fn transform_producing_invalid_page_fails_at_output() {
    let registry = registry();

    let error = transform_and_validate(
        schema(&registry, "financial-model").as_ref(),
        schema(&registry, "dashboard").as_ref(),
        |model: Value| Ok::<_, String>(json!({"title": model["title"].clone()})),
        &financial_model(),
        Some("financial-model"),
    )
    .into_error()
    .expect("output should be rejected");

    assert_eq!(error.kind, FailureKind::Schema);
    assert_eq!(error.context_path.as_deref(), Some("financial-model.output"));
    assert_eq!(
        error.message,
        "Validation failed for financial-model.output: Required at metrics"
    );
}

#[test]
fn transform_error_names_the_phase() {
    let registry = registry();

    let error = transform_and_validate(
        schema(&registry, "financial-model").as_ref(),
        schema(&registry, "dashboard").as_ref(),
        |_: Value| Err::<Value, _>("unsupported currency"),
        &financial_model(),
        Some("financial-model"),
    )
    .into_error()
    .expect("transform should fail");

    assert!(error.message.contains("Transformation failed"));
    assert!(!error.message.contains(".output"));
    assert!(error.issues.is_empty());
}

#[test]
fn batch_with_one_bad_page() {
    let registry = registry();
    let requests = vec![
        BatchRequest::new(schema(&registry, "dashboard"), json!({"title": "D", "metrics": []}))
            .with_context("dashboard"),
        BatchRequest::new(schema(&registry, "team"), json!({"title": "Team"}))
            .with_context("team"),
        BatchRequest::new(registry.generic().clone(), json!({})).with_context("unknown-page"),
    ];

    let batch = validate_batch(&requests);

    assert_eq!(batch.results.len(), 3);
    assert!(!batch.all_valid);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(
        batch.errors[0].message,
        "Validation failed for team: Required at members"
    );
}

#[tokio::test]
async fn concurrent_batch_matches_sequential() -> anyhow::Result<()> {
    let registry = registry();
    let requests: Vec<_> = ["dashboard", "team", "roadmap", "market-analysis"]
        .into_iter()
        .map(|path| {
            BatchRequest::new(schema(&registry, path), json!({"title": path})).with_context(path)
        })
        .collect();

    let sequential = validate_batch(&requests);
    let concurrent = BatchValidator::with_defaults().run_concurrent(requests).await;

    assert_eq!(concurrent, sequential);
    assert_eq!(concurrent.failed_count(), 4);
    let contexts: Vec<_> = concurrent
        .errors
        .iter()
        .filter_map(|e| e.context_path.clone())
        .collect();
    assert_eq!(contexts, ["dashboard", "team", "roadmap", "market-analysis"]);
    Ok(())
}
