//! Tool result compression — the model-facing view of tool output.
//!
//! Raw tool results run to thousands of tokens; a context-limited model
//! only needs the handful of numbers and paths that drive its next
//! decision. [`compress`] reduces a successful result to that subset
//! using per-tool-family rules, while failed results pass through
//! untouched. Error detail is never worth losing.
//!
//! The full, uncompressed result belongs in the workflow state; this
//! crate only shapes what the model sees. Compression is a pure
//! function over its two inputs — no state, no I/O.

mod rules;

use datapilot_core::JsonMap;
use serde_json::Value;
use tracing::debug;

/// The family of compression rules applied to a tool's result.
///
/// Families group tools whose results carry the same decision-relevant
/// fields; each family has one extraction rule and one static
/// follow-up hint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    Profiling,
    QualityCheck,
    DataMutation,
    ModelTraining,
    Report,
    Tuning,
    Generic,
}

impl ToolFamily {
    /// Route a tool name to its compression family.
    ///
    /// Unknown names fall through to [`ToolFamily::Generic`]. Adding a
    /// family means adding an arm here plus an extraction rule — the
    /// dispatch itself never changes shape.
    pub fn classify(tool_name: &str) -> Self {
        match tool_name {
            "profile_dataset" => ToolFamily::Profiling,
            "detect_data_quality_issues" => ToolFamily::QualityCheck,
            "clean_missing_values" | "handle_outliers" | "encode_categorical" => {
                ToolFamily::DataMutation
            }
            "train_baseline_models" => ToolFamily::ModelTraining,
            "generate_plotly_dashboard"
            | "generate_ydata_profiling_report"
            | "generate_combined_eda_report" => ToolFamily::Report,
            "hyperparameter_tuning" => ToolFamily::Tuning,
            _ => ToolFamily::Generic,
        }
    }

    /// Static, hand-authored follow-up hints for this family.
    pub fn next_steps(self) -> &'static [&'static str] {
        match self {
            ToolFamily::Profiling => &["clean_missing_values", "detect_data_quality_issues"],
            ToolFamily::QualityCheck => &["clean_missing_values", "handle_outliers"],
            ToolFamily::DataMutation => &["Use this file for next step"],
            ToolFamily::ModelTraining => &["hyperparameter_tuning", "generate_combined_eda_report"],
            ToolFamily::Report => &["Report ready for viewing"],
            ToolFamily::Tuning => &["perform_cross_validation", "generate_model_performance_plots"],
            ToolFamily::Generic => &["Continue workflow"],
        }
    }
}

/// Compress a successful tool result into its decision-relevant summary.
///
/// The output carries `success`, `tool`, a family-specific `summary`
/// and static `next_steps` hints. Failure results (`success: false`)
/// are returned unchanged: diagnosis and retry decisions need the full
/// error, not a digest.
///
/// Extraction never fails on missing or oddly-typed fields — absent
/// data defaults instead, since result shapes vary across tool
/// versions. A model-training result listing no models is the one case
/// with no `summary` at all.
pub fn compress(tool_name: &str, result: &Value) -> Value {
    if !succeeded(result) {
        // Keep full error info for diagnosis.
        return result.clone();
    }

    let family = ToolFamily::classify(tool_name);
    let nested = result.get("result");
    let payload = nested.and_then(Value::as_object);

    let summary = match family {
        ToolFamily::Profiling => Some(rules::profiling(payload)),
        ToolFamily::QualityCheck => Some(rules::quality(payload)),
        ToolFamily::DataMutation => Some(rules::mutation(payload)),
        ToolFamily::ModelTraining => rules::training(payload),
        ToolFamily::Report => Some(rules::report(tool_name, payload)),
        ToolFamily::Tuning => Some(rules::tuning(payload)),
        ToolFamily::Generic => Some(rules::generic(nested)),
    };

    debug!(tool = tool_name, family = ?family, "Tool result compressed");

    let mut out = JsonMap::new();
    out.insert("success".into(), Value::Bool(true));
    out.insert("tool".into(), Value::String(tool_name.to_string()));
    if let Some(summary) = summary {
        out.insert("summary".into(), Value::Object(summary));
    }
    out.insert(
        "next_steps".into(),
        Value::Array(
            family
                .next_steps()
                .iter()
                .map(|step| Value::String((*step).to_string()))
                .collect(),
        ),
    );
    Value::Object(out)
}

/// Top-level success flag; absent counts as success.
fn succeeded(result: &Value) -> bool {
    result
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

// ── Tests ─────────────────────────────────────────────────────────────────
