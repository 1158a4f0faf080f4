#![doc = include_str!("../README.md")]

// Core segmentation
pub mod directions;
pub mod error;
pub mod lobe;
pub mod segmenter;
pub mod sh;

// Volume streaming and tooling support
pub mod config;
pub mod diagnostics;
pub mod io;
pub mod pipeline;

// --- High-level re-exports -------------------------------------------------

pub use crate::directions::{DirectionMask, DirectionSet, DirectionSource};
pub use crate::error::{ConfigError, Result, SegmentError};
pub use crate::lobe::{Lobe, LobeCollection, LookupTable, VoxelCoord};
pub use crate::segmenter::{Segmenter, SegmenterOptions};
pub use crate::sh::AmplitudeSampler;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use fod_lobes::prelude::*;
///
/// # fn main() -> fod_lobes::Result<()> {
/// let dirs = DirectionSet::half_sphere(300)?;
/// let segmenter = Segmenter::new(&dirs, SegmenterOptions::default())?;
///
/// let amplitudes: Vec<f32> = dirs.dirs().iter().map(|d| d.z.abs().powi(8)).collect();
/// let lobes = segmenter.segment(&amplitudes, [0, 0, 0])?;
/// println!("{} lobes, first peak {:.3}", lobes.len(), lobes.lobes[0].peak_value());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::pipeline::{CoefficientVolume, CollectingSink, Pipeline, PipelineOptions};
    pub use crate::{
        AmplitudeSampler, DirectionSet, Lobe, LobeCollection, Segmenter, SegmenterOptions,
    };
}
