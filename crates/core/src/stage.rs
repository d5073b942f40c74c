//! Pipeline stage identifiers.
//!
//! Every state update stamps one of these into the audit trail. The
//! serialized form is the canonical snake_case name, so checkpoints
//! stay readable and diff-friendly.

use serde::{Deserialize, Serialize};

/// A completed pipeline stage, as recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DatasetLoaded,
    ProfilingComplete,
    QualityChecked,
    DataCleaned,
    FeaturesEngineered,
    ModelTrained,
}

impl Stage {
    /// All stages in canonical pipeline order.
    pub fn all() -> [Stage; 6] {
        [
            Stage::DatasetLoaded,
            Stage::ProfilingComplete,
            Stage::QualityChecked,
            Stage::DataCleaned,
            Stage::FeaturesEngineered,
            Stage::ModelTrained,
        ]
    }

    /// The canonical snake_case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::DatasetLoaded => "dataset_loaded",
            Stage::ProfilingComplete => "profiling_complete",
            Stage::QualityChecked => "quality_checked",
            Stage::DataCleaned => "data_cleaned",
            Stage::FeaturesEngineered => "features_engineered",
            Stage::ModelTrained => "model_trained",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
