//! Serializable reports produced by the segmentation tool.
//!
//! `PipelineReport` is returned by [`crate::pipeline::Pipeline::run`];
//! `CollectionSummary` flattens a voxel's lobes into plain arrays for JSON
//! output, and `RunReport` bundles both with per-stage timings.

pub mod lobes;
pub mod report;

pub use lobes::{CollectionSummary, LobeSummary};
pub use report::{PipelineReport, RunReport, StageTiming};
