use serde::{Deserialize, Serialize};

/// Worker pool sizing for [`super::Pipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Segmentation threads.
    pub workers: usize,
    /// Capacity of the work and output queues.
    pub queue_depth: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers,
            queue_depth: 4 * workers,
        }
    }
}

impl PipelineOptions {
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            queue_depth: 4 * workers,
        }
    }
}
