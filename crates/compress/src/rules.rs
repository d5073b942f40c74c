//! Per-family field extraction.
//!
//! Each rule reads specific fields out of a tool's nested payload and
//! emits a small fixed-shape summary. Absent or oddly-typed fields
//! default instead of failing: payload shapes drift across tool
//! versions, and partial data still has to produce a usable summary.

use datapilot_core::{JsonMap, first_of, num_field, truthy};
use serde_json::{Value, json};

/// Decimal places kept for model scores.
const SCORE_DECIMALS: i32 = 4;
/// Decimal places kept for megabyte sizes.
const SIZE_DECIMALS: i32 = 1;
/// Column names listed by a profiling summary.
const KEY_COLUMN_LIMIT: usize = 5;
/// Character cap on the generic fallback's string rendering.
const RENDER_LIMIT: usize = 200;

/// Keys the generic fallback copies through when present.
const GENERIC_KEYS: &[&str] = &["output_path", "output_file", "status", "message", "success"];

// ── Extraction rules ──────────────────────────────────────────────────────

/// Profiling: shape counts, missing rate, and a bounded column listing
/// instead of the full schema.
pub(crate) fn profiling(payload: Option<&JsonMap>) -> JsonMap {
    let key_columns: Vec<Value> = payload
        .and_then(|p| p.get("columns"))
        .and_then(Value::as_object)
        .map(|columns| {
            columns
                .keys()
                .take(KEY_COLUMN_LIMIT)
                .map(|name| Value::String(name.clone()))
                .collect()
        })
        .unwrap_or_default();

    let size_mb = payload.map(|p| num_field(p, "memory_usage_mb")).unwrap_or(0.0);

    let mut summary = JsonMap::new();
    summary.insert("rows".into(), raw(payload, "num_rows"));
    summary.insert("cols".into(), raw(payload, "num_columns"));
    summary.insert("missing_pct".into(), raw(payload, "missing_percentage"));
    summary.insert("numeric_cols".into(), json!(array_len(payload, "numeric_columns")));
    summary.insert(
        "categorical_cols".into(),
        json!(array_len(payload, "categorical_columns")),
    );
    summary.insert("file_size_mb".into(), json!(round_to(size_mb, SIZE_DECIMALS)));
    summary.insert("key_columns".into(), Value::Array(key_columns));
    summary
}

/// Quality check: issue counts plus the three presence flags.
pub(crate) fn quality(payload: Option<&JsonMap>) -> JsonMap {
    let mut summary = JsonMap::new();
    summary.insert("total_issues".into(), raw_or(payload, "total_issues", json!(0)));
    summary.insert("critical_issues".into(), raw_or(payload, "critical_issues", json!(0)));
    summary.insert("missing_data".into(), raw(payload, "has_missing"));
    summary.insert("outliers".into(), raw(payload, "has_outliers"));
    summary.insert("duplicates".into(), raw(payload, "has_duplicates"));
    summary
}

/// Data mutation (cleaning, outlier handling, encoding): where the new
/// artifact lives and whether anything actually changed.
///
/// Tools report change metadata under either `changes` or
/// `imputed_columns`; both count as signals, neither supersedes the
/// other.
pub(crate) fn mutation(payload: Option<&JsonMap>) -> JsonMap {
    let changed = payload.is_some_and(|p| {
        p.get("changes").is_some_and(truthy) || p.get("imputed_columns").is_some_and(truthy)
    });

    let mut summary = JsonMap::new();
    summary.insert(
        "output_file".into(),
        first_present(payload, &["output_file", "output_path"]),
    );
    summary.insert(
        "rows_processed".into(),
        first_present(payload, &["rows_after", "num_rows"]),
    );
    summary.insert("changes_made".into(), Value::Bool(changed));
    summary
}

/// Model training: the single best model by test score. `None` when no
/// models were trained — an empty leaderboard has nothing to summarize.
pub(crate) fn training(payload: Option<&JsonMap>) -> Option<JsonMap> {
    let models = payload
        .and_then(|p| p.get("models"))
        .and_then(Value::as_array)
        .filter(|models| !models.is_empty())?;

    // Stable max: the first model wins ties on test_score.
    let mut best = &models[0];
    let mut best_score = score_field(best, "test_score");
    for model in &models[1..] {
        let score = score_field(model, "test_score");
        if score > best_score {
            best = model;
            best_score = score;
        }
    }

    let mut summary = JsonMap::new();
    summary.insert(
        "best_model".into(),
        best.get("model").cloned().unwrap_or(Value::Null),
    );
    summary.insert("test_score".into(), json!(round_to(best_score, SCORE_DECIMALS)));
    summary.insert(
        "train_score".into(),
        json!(round_to(score_field(best, "train_score"), SCORE_DECIMALS)),
    );
    summary.insert("task_type".into(), raw(payload, "task_type"));
    summary.insert("models_trained".into(), json!(models.len()));
    Some(summary)
}

/// Report generation: the artifact path and which generator made it.
pub(crate) fn report(tool_name: &str, payload: Option<&JsonMap>) -> JsonMap {
    let mut summary = JsonMap::new();
    summary.insert(
        "report_path".into(),
        first_present(payload, &["report_path", "output_path"]),
    );
    summary.insert("report_type".into(), Value::String(tool_name.to_string()));
    summary.insert("success".into(), Value::Bool(true));
    summary
}

/// Hyperparameter tuning: winning parameters and score.
pub(crate) fn tuning(payload: Option<&JsonMap>) -> JsonMap {
    let best_score = payload.map(|p| num_field(p, "best_score")).unwrap_or(0.0);

    let mut summary = JsonMap::new();
    summary.insert("best_params".into(), raw_or(payload, "best_params", json!({})));
    summary.insert("best_score".into(), json!(round_to(best_score, SCORE_DECIMALS)));
    summary.insert("model_type".into(), raw(payload, "model_type"));
    summary.insert("trials_completed".into(), raw(payload, "n_trials"));
    summary
}

/// Fallback for unknown tools: copy through a small allowlist of common
/// fields, else a truncated string rendering, else a bare marker.
pub(crate) fn generic(nested: Option<&Value>) -> JsonMap {
    let mut summary = JsonMap::new();
    match nested {
        Some(Value::Object(payload)) => {
            for key in GENERIC_KEYS {
                if let Some(value) = payload.get(*key) {
                    summary.insert((*key).to_string(), value.clone());
                }
            }
            if summary.is_empty() {
                summary.insert("result".into(), Value::String("completed".into()));
            }
        }
        Some(value) if truthy(value) => {
            summary.insert("result".into(), Value::String(render_truncated(value)));
        }
        _ => {
            summary.insert("result".into(), Value::String("completed".into()));
        }
    }
    summary
}

// ── Helpers ───────────────────────────────────────────────────────────────

/// Copy a field verbatim, `null` when absent.
fn raw(payload: Option<&JsonMap>, key: &str) -> Value {
    payload
        .and_then(|p| p.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Copy a field verbatim, with a default for the absent case only.
fn raw_or(payload: Option<&JsonMap>, key: &str, default: Value) -> Value {
    payload.and_then(|p| p.get(key)).cloned().unwrap_or(default)
}

/// First-present key's value, `null` when none is present.
fn first_present(payload: Option<&JsonMap>, keys: &[&str]) -> Value {
    payload
        .and_then(|p| first_of(p, keys))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Length of an array field, 0 when absent or not an array.
fn array_len(payload: Option<&JsonMap>, key: &str) -> usize {
    payload
        .and_then(|p| p.get(key))
        .and_then(Value::as_array)
        .map_or(0, |items| items.len())
}

/// Numeric score of a leaderboard entry, 0 when absent or not an object.
fn score_field(model: &Value, key: &str) -> f64 {
    model.as_object().map(|m| num_field(m, key)).unwrap_or(0.0)
}

/// Round half away from zero to a fixed number of decimal places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// String rendering of a non-object payload, capped at [`RENDER_LIMIT`]
/// characters.
fn render_truncated(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    rendered.chars().take(RENDER_LIMIT).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────
