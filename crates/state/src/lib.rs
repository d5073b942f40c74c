//! Workflow state — the durable record of a single analysis-pipeline run.
//!
//! Stores each stage's full result mapping, tracks the active dataset
//! artifact, and answers step-scoped context queries. The state is:
//!
//! - **Run-scoped**: one instance per pipeline run, explicitly owned by
//!   the orchestrating caller — never a process-wide singleton
//! - **Serializable**: checkpointed to a JSON file and reloaded across
//!   process restarts
//! - **Sliceable**: produces the minimal context subset a given upcoming
//!   step needs, so a context-limited model never sees the full history
//!
//! Full fidelity lives here and in the checkpoint file; the model-facing
//! view is always a slice.

use chrono::{DateTime, Utc};
use datapilot_core::{JsonMap, Stage, StateError, str_field};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

// ── Data Structures ───────────────────────────────────────────────────────

/// Accumulated state of one pipeline run.
///
/// Stage summary fields are independently nullable: a later stage's
/// update never requires an earlier stage to have run, so partial or
/// re-entrant pipelines stay representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Schema/shape metadata captured when the dataset is loaded.
    #[serde(default)]
    pub dataset_info: Option<JsonMap>,

    /// Full profiling result, overwritten on each profiling run.
    #[serde(default)]
    pub profiling_summary: Option<JsonMap>,

    /// Full quality-check result.
    #[serde(default)]
    pub quality_issues: Option<JsonMap>,

    /// Full cleaning result.
    #[serde(default)]
    pub cleaning_results: Option<JsonMap>,

    /// Full feature-engineering result.
    #[serde(default)]
    pub feature_engineering: Option<JsonMap>,

    /// Full modeling result.
    #[serde(default)]
    pub modeling_results: Option<JsonMap>,

    /// Paths of generated visualizations, append-only.
    #[serde(default)]
    pub visualization_paths: Vec<String>,

    /// Path to the most recently produced dataset artifact.
    #[serde(default)]
    pub current_file: Option<String>,

    /// Prediction target, set by the caller rather than a stage update.
    #[serde(default)]
    pub target_column: Option<String>,

    /// Task kind (classification/regression), set by the caller.
    #[serde(default)]
    pub task_type: Option<String>,

    /// Audit trail: one entry per update call, in call order,
    /// duplicates allowed.
    #[serde(default)]
    pub steps_completed: Vec<Stage>,

    /// When this run started. Preserved verbatim across save/load.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Keys under which stage results report a new dataset artifact.
const ARTIFACT_KEYS: &[&str] = &["output_file", "output_path"];

// ── Implementation ────────────────────────────────────────────────────────

impl WorkflowState {
    /// Create an empty state for a new pipeline run.
    pub fn new() -> Self {
        Self {
            dataset_info: None,
            profiling_summary: None,
            quality_issues: None,
            cleaning_results: None,
            feature_engineering: None,
            modeling_results: None,
            visualization_paths: Vec::new(),
            current_file: None,
            target_column: None,
            task_type: None,
            steps_completed: Vec::new(),
            created_at: Utc::now(),
        }
    }

    // ── Stage updates ──

    /// Store dataset metadata and stamp [`Stage::DatasetLoaded`].
    ///
    /// A non-empty `file_path` field becomes the active artifact.
    pub fn record_dataset(&mut self, info: JsonMap) {
        self.refresh_current_file(&info, &["file_path"]);
        self.dataset_info = Some(info);
        self.complete(Stage::DatasetLoaded);
    }

    /// Store the profiling result and stamp [`Stage::ProfilingComplete`].
    pub fn record_profiling(&mut self, summary: JsonMap) {
        self.profiling_summary = Some(summary);
        self.complete(Stage::ProfilingComplete);
    }

    /// Store the quality-check result and stamp [`Stage::QualityChecked`].
    pub fn record_quality(&mut self, issues: JsonMap) {
        self.quality_issues = Some(issues);
        self.complete(Stage::QualityChecked);
    }

    /// Store the cleaning result and stamp [`Stage::DataCleaned`].
    ///
    /// A non-empty `output_file`/`output_path` becomes the active artifact.
    pub fn record_cleaning(&mut self, results: JsonMap) {
        self.refresh_current_file(&results, ARTIFACT_KEYS);
        self.cleaning_results = Some(results);
        self.complete(Stage::DataCleaned);
    }

    /// Store the feature-engineering result and stamp
    /// [`Stage::FeaturesEngineered`].
    ///
    /// A non-empty `output_file`/`output_path` becomes the active artifact.
    pub fn record_features(&mut self, results: JsonMap) {
        self.refresh_current_file(&results, ARTIFACT_KEYS);
        self.feature_engineering = Some(results);
        self.complete(Stage::FeaturesEngineered);
    }

    /// Store the modeling result and stamp [`Stage::ModelTrained`].
    pub fn record_modeling(&mut self, results: JsonMap) {
        self.modeling_results = Some(results);
        self.complete(Stage::ModelTrained);
    }

    /// Track a generated visualization. Side artifact only — does not
    /// stamp the audit trail.
    pub fn add_visualization(&mut self, path: impl Into<String>) {
        self.visualization_paths.push(path.into());
    }

    fn refresh_current_file(&mut self, result: &JsonMap, keys: &[&str]) {
        // First key holding a usable path wins; null or empty values
        // fall through to the next key.
        if let Some(path) = keys
            .iter()
            .find_map(|key| str_field(result, key).filter(|p| !p.is_empty()))
        {
            self.current_file = Some(path.to_string());
        }
    }

    fn complete(&mut self, stage: Stage) {
        self.steps_completed.push(stage);
        debug!(stage = %stage, current_file = ?self.current_file, "Stage recorded");
    }

    // ── Progress queries ──

    /// Whether `stage` appears anywhere in the audit trail.
    pub fn is_completed(&self, stage: Stage) -> bool {
        self.steps_completed.contains(&stage)
    }

    /// One-line progress description for logs.
    pub fn summarize(&self) -> String {
        format!(
            "{} steps completed, {} visualizations, current file: {}",
            self.steps_completed.len(),
            self.visualization_paths.len(),
            self.current_file.as_deref().unwrap_or("none")
        )
    }

    // ── Context slicing ──

    /// Build the context slice for the upcoming `step`.
    ///
    /// Always contains `current_file`, `target_column`, `task_type` and
    /// `steps_completed`; stage-specific fields come from
    /// [`STEP_CONTEXT`]. An unrecognized step name is not an error — it
    /// degrades to the base fields alone.
    pub fn context_for_step(&self, step: &str) -> JsonMap {
        let mut context = JsonMap::new();
        context.insert("current_file".into(), opt_string(&self.current_file));
        context.insert("target_column".into(), opt_string(&self.target_column));
        context.insert("task_type".into(), opt_string(&self.task_type));
        context.insert(
            "steps_completed".into(),
            Value::Array(
                self.steps_completed
                    .iter()
                    .map(|s| Value::String(s.as_str().into()))
                    .collect(),
            ),
        );

        match STEP_CONTEXT.iter().find(|(name, _)| *name == step) {
            Some((_, fields)) => {
                for field in *fields {
                    context.insert(field.key().into(), field.read(self));
                }
            }
            None => {
                debug!(step, "No stage-specific context for step, using base fields");
            }
        }

        context
    }

    // ── Persistence ──

    /// Write a full-state checkpoint as pretty-printed JSON, creating
    /// parent directories on demand.
    ///
    /// The write replaces any existing file wholesale; there is no
    /// partial-write recovery, so each save is a complete checkpoint.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StateError::Storage(format!("Failed to create state directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StateError::Storage(format!("Failed to serialize state: {e}")))?;
        fs::write(path, content)
            .map_err(|e| StateError::Storage(format!("Failed to write state file: {e}")))?;

        debug!(path = %path.display(), steps = self.steps_completed.len(), "State checkpoint written");
        Ok(())
    }

    /// Reload a checkpoint written by [`WorkflowState::save`].
    ///
    /// Fields missing from the file (older schema) fall back to their
    /// construction-time defaults. A file that cannot be read or parsed
    /// at all is an error, not an empty state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| StateError::Storage(format!("Failed to read state file: {e}")))?;
        let state: Self = serde_json::from_str(&content)
            .map_err(|e| StateError::Corrupt(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), steps = state.steps_completed.len(), "State checkpoint loaded");
        Ok(state)
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Context field selectors ───────────────────────────────────────────────

/// A state field a context slice can include, with the key it is
/// published under.
#[derive(Debug, Clone, Copy)]
enum ContextField {
    DatasetInfo,
    Profiling,
    QualityIssues,
    CleaningResults,
    FeatureEngineering,
    ModelingResults,
    TargetColumn,
    TaskType,
}

/// Minimal-sufficient context per upcoming step, intentionally omitting
/// fields irrelevant to that step's decision. Adding a pipeline stage is
/// a data change here, not new branching.
const STEP_CONTEXT: &[(&str, &[ContextField])] = &[
    ("profiling", &[ContextField::DatasetInfo]),
    (
        "quality_check",
        &[ContextField::DatasetInfo, ContextField::Profiling],
    ),
    (
        "cleaning",
        &[ContextField::QualityIssues, ContextField::Profiling],
    ),
    (
        "feature_engineering",
        &[ContextField::CleaningResults, ContextField::DatasetInfo],
    ),
    (
        "modeling",
        &[
            ContextField::FeatureEngineering,
            ContextField::CleaningResults,
            ContextField::TargetColumn,
            ContextField::TaskType,
        ],
    ),
    (
        "visualization",
        &[ContextField::ModelingResults, ContextField::DatasetInfo],
    ),
];

impl ContextField {
    /// Key this field is published under in the slice.
    fn key(self) -> &'static str {
        match self {
            ContextField::DatasetInfo => "dataset_info",
            ContextField::Profiling => "profiling",
            ContextField::QualityIssues => "quality_issues",
            ContextField::CleaningResults => "cleaning_results",
            ContextField::FeatureEngineering => "feature_engineering",
            ContextField::ModelingResults => "modeling_results",
            ContextField::TargetColumn => "target_column",
            ContextField::TaskType => "task_type",
        }
    }

    fn read(self, state: &WorkflowState) -> Value {
        match self {
            ContextField::DatasetInfo => opt_map(&state.dataset_info),
            ContextField::Profiling => opt_map(&state.profiling_summary),
            ContextField::QualityIssues => opt_map(&state.quality_issues),
            ContextField::CleaningResults => opt_map(&state.cleaning_results),
            ContextField::FeatureEngineering => opt_map(&state.feature_engineering),
            ContextField::ModelingResults => opt_map(&state.modeling_results),
            ContextField::TargetColumn => opt_string(&state.target_column),
            ContextField::TaskType => opt_string(&state.task_type),
        }
    }
}

fn opt_map(field: &Option<JsonMap>) -> Value {
    field.clone().map(Value::Object).unwrap_or(Value::Null)
}

fn opt_string(field: &Option<String>) -> Value {
    field.clone().map(Value::String).unwrap_or(Value::Null)
}

// ── Tests ─────────────────────────────────────────────────────────────────
