//! Arbiter configuration file schemas, tagged by framework name.
use serde::{Deserialize, Serialize};

use crate::taskmix::TaskProfile;

const fn default_reference_point() -> f64 {
    -1.0
}

/// `{startPoint, intervalSecs, taskProfiles}` — the Kayak baseline's config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KayakConfig {
    pub start_point: f64,
    pub interval_secs: f64,
    pub task_profiles: Vec<TaskProfile>,
}

/// `{startPoint, intervalSecs, stepSizeRel, stopPrecision, referencePoint, taskProfiles}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PyxisConfig {
    pub start_point: f64,
    pub interval_secs: f64,
    pub step_size_rel: f64,
    pub stop_precision: f64,
    /// Oracle target; `< 0` disables reference-based convergence.
    #[serde(default = "default_reference_point")]
    pub reference_point: f64,
    pub task_profiles: Vec<TaskProfile>,
}
