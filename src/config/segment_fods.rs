use crate::directions::DirectionSource;
use crate::io::read_json_file;
use crate::error::Result;
use crate::pipeline::PipelineOptions;
use crate::segmenter::SegmenterOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct SegmentToolConfig {
    /// Coefficient volume (JSON `CoefficientVolume`).
    pub input: PathBuf,
    /// Row-major amplitude transform, one row per direction.
    pub transform: PathBuf,
    /// Direction sources tried in order; the first that builds is used.
    pub directions: Vec<DirectionSource>,
    #[serde(default)]
    pub segmenter: SegmenterOptions,
    #[serde(default)]
    pub pipeline: PipelineOptions,
    pub output: SegmentOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct SegmentOutputConfig {
    pub report_json: PathBuf,
    /// Omit per-voxel lobes from the report, keeping only counters.
    #[serde(default)]
    pub summary_only: bool,
}

pub fn load_config(path: &Path) -> Result<SegmentToolConfig> {
    let config: SegmentToolConfig = read_json_file(path)?;
    config.segmenter.validate()?;
    Ok(config)
}
