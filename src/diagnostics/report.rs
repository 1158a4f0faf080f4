use super::CollectionSummary;
use serde::{Deserialize, Serialize};

/// Counters for one [`crate::pipeline::Pipeline::run`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub voxels_read: usize,
    /// Collections accepted by the sink.
    pub voxels_segmented: usize,
    pub lobes_emitted: usize,
    pub workers: usize,
    pub elapsed_ms: f64,
}

/// Wall-clock time spent in one step of a tool run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Everything the command-line tool writes out.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub direction_source: String,
    pub direction_count: usize,
    pub lmax: usize,
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
    pub pipeline: PipelineReport,
    pub voxels: Vec<CollectionSummary>,
}

impl RunReport {
    pub fn push_stage(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.total_ms += elapsed_ms;
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }
}
