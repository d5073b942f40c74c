//! End-to-end tests for the DataPilot core.
//!
//! These tests exercise the orchestrator's control flow: a tool produces
//! a full result, the compressor shapes the model-facing view, the full
//! result goes into workflow state, and the next model turn gets a
//! step-scoped context slice.

use datapilot_compress::compress;
use datapilot_core::{JsonMap, Stage};
use datapilot_state::WorkflowState;
use serde_json::{Value, json};

fn map(value: Value) -> JsonMap {
    value.as_object().cloned().unwrap()
}

fn profiling_result() -> Value {
    json!({
        "success": true,
        "result": {
            "num_rows": 5000,
            "num_columns": 12,
            "missing_percentage": 4.2,
            "numeric_columns": ["age", "income", "score"],
            "categorical_columns": ["city", "segment"],
            "memory_usage_mb": 3.47,
            "columns": {
                "age": "int64", "income": "float64", "score": "float64",
                "city": "object", "segment": "object", "joined": "datetime64"
            },
            "detailed_stats": {"age": {"mean": 41.2, "std": 12.9, "p25": 31.0, "p75": 52.0}}
        }
    })
}

fn cleaning_result() -> Value {
    json!({
        "success": true,
        "result": {
            "output_file": "work/cleaned.csv",
            "rows_after": 4890,
            "changes": {"age": "median_imputed", "income": "dropped_nulls"}
        }
    })
}

fn modeling_result() -> Value {
    json!({
        "success": true,
        "result": {
            "task_type": "classification",
            "models": [
                {"model": "logistic_regression", "test_score": 0.8412, "train_score": 0.8533},
                {"model": "random_forest", "test_score": 0.8907, "train_score": 0.9621},
                {"model": "gradient_boosting", "test_score": 0.8711, "train_score": 0.9102}
            ]
        }
    })
}

// ── E2E: Full Pipeline Run ───────────────────────────────────────────────

#[test]
fn e2e_full_pipeline_compresses_and_records() {
    let mut state = WorkflowState::new();
    state.target_column = Some("churn".into());
    state.task_type = Some("classification".into());

    // Stage 1: load the dataset.
    state.record_dataset(map(json!({"file_path": "data/raw.csv", "num_rows": 5000})));

    // Stage 2: profile. The model sees the compressed view; the state
    // keeps the full payload.
    let raw = profiling_result();
    let view = compress("profile_dataset", &raw);
    state.record_profiling(map(raw["result"].clone()));

    let summary = view.get("summary").unwrap();
    assert_eq!(summary.get("rows"), Some(&json!(5000)));
    assert_eq!(summary.get("file_size_mb"), Some(&json!(3.5)));
    assert_eq!(
        summary.get("key_columns"),
        Some(&json!(["age", "income", "score", "city", "segment"]))
    );
    // The verbose per-column stats never reach the model view.
    assert!(summary.get("detailed_stats").is_none());
    // But they survive in full fidelity in the state.
    assert!(
        state
            .profiling_summary
            .as_ref()
            .unwrap()
            .contains_key("detailed_stats")
    );

    // Stage 3: clean. The artifact path moves with the update.
    let raw = cleaning_result();
    let view = compress("clean_missing_values", &raw);
    state.record_cleaning(map(raw["result"].clone()));

    assert_eq!(view["summary"].get("changes_made"), Some(&json!(true)));
    assert_eq!(state.current_file.as_deref(), Some("work/cleaned.csv"));

    // Stage 4: train. Best model only in the view.
    let raw = modeling_result();
    let view = compress("train_baseline_models", &raw);
    state.record_modeling(map(raw["result"].clone()));

    assert_eq!(view["summary"].get("best_model"), Some(&json!("random_forest")));
    assert_eq!(view["summary"].get("models_trained"), Some(&json!(3)));

    // Audit trail reflects every update, in order.
    assert_eq!(
        state.steps_completed,
        vec![
            Stage::DatasetLoaded,
            Stage::ProfilingComplete,
            Stage::DataCleaned,
            Stage::ModelTrained,
        ]
    );
    assert!(state.is_completed(Stage::ModelTrained));
}

#[test]
fn e2e_compressed_view_is_much_smaller_than_raw() {
    let raw = profiling_result();
    let view = compress("profile_dataset", &raw);

    let raw_len = serde_json::to_string(&raw).unwrap().len();
    let view_len = serde_json::to_string(&view).unwrap().len();
    assert!(
        view_len < raw_len,
        "compressed view ({view_len}b) should be smaller than raw ({raw_len}b)"
    );
}

// ── E2E: Context Slicing Between Turns ───────────────────────────────────

#[test]
fn e2e_each_turn_sees_only_its_slice() {
    let mut state = WorkflowState::new();
    state.target_column = Some("churn".into());
    state.task_type = Some("classification".into());
    state.record_dataset(map(json!({"file_path": "data/raw.csv"})));
    state.record_profiling(map(profiling_result()["result"].clone()));
    state.record_quality(map(json!({"total_issues": 3, "has_missing": true})));
    state.record_cleaning(map(cleaning_result()["result"].clone()));
    state.record_modeling(map(modeling_result()["result"].clone()));

    // The cleaning turn gets quality issues and profiling, nothing else.
    let cleaning_turn = state.context_for_step("cleaning");
    assert!(cleaning_turn.contains_key("quality_issues"));
    assert!(cleaning_turn.contains_key("profiling"));
    assert!(!cleaning_turn.contains_key("dataset_info"));
    assert!(!cleaning_turn.contains_key("modeling_results"));

    // The modeling turn gets engineered features and the targets.
    let modeling_turn = state.context_for_step("modeling");
    assert_eq!(modeling_turn.get("target_column"), Some(&json!("churn")));
    assert_eq!(modeling_turn.get("task_type"), Some(&json!("classification")));
    assert!(!modeling_turn.contains_key("profiling"));

    // Every turn carries the base fields.
    for step in ["profiling", "quality_check", "cleaning", "modeling", "visualization"] {
        let turn = state.context_for_step(step);
        assert_eq!(turn.get("current_file"), Some(&json!("work/cleaned.csv")));
        assert!(turn.contains_key("steps_completed"));
    }
}

// ── E2E: Checkpoint / Resume ─────────────────────────────────────────────

#[test]
fn e2e_checkpoint_and_resume_midway() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs").join("7").join("state.json");

    // First session: run through cleaning, then checkpoint.
    let mut state = WorkflowState::new();
    state.record_dataset(map(json!({"file_path": "data/raw.csv"})));
    state.record_profiling(map(profiling_result()["result"].clone()));
    state.record_cleaning(map(cleaning_result()["result"].clone()));
    state.add_visualization("plots/missing_matrix.png");
    state.save(&path).unwrap();

    // Second session: resume and finish the pipeline.
    let mut resumed = WorkflowState::load(&path).unwrap();
    assert_eq!(resumed, state);
    assert_eq!(resumed.current_file.as_deref(), Some("work/cleaned.csv"));

    resumed.record_modeling(map(modeling_result()["result"].clone()));
    assert_eq!(resumed.steps_completed.len(), 4);
    assert!(resumed.is_completed(Stage::ModelTrained));

    // The resumed run checkpoints over the old file.
    resumed.save(&path).unwrap();
    let reloaded = WorkflowState::load(&path).unwrap();
    assert_eq!(reloaded, resumed);
}

// ── E2E: Failure Handling ────────────────────────────────────────────────

#[test]
fn e2e_failed_tool_bypasses_compression_and_state() {
    let mut state = WorkflowState::new();
    state.record_dataset(map(json!({"file_path": "data/raw.csv"})));

    let failure = json!({
        "success": false,
        "error": "MemoryError: dataset too large for profiling",
        "result": {"partial_rows": 120_000, "traceback": ["frame a", "frame b"]}
    });

    // The orchestrator shows the model the full error...
    let view = compress("profile_dataset", &failure);
    assert_eq!(view, failure);

    // ...and records nothing, so the state still reflects only the load.
    assert!(state.profiling_summary.is_none());
    assert_eq!(state.steps_completed, vec![Stage::DatasetLoaded]);
    assert_eq!(state.summarize(), "1 steps completed, 0 visualizations, current file: data/raw.csv");
}
