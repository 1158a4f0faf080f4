//! Lobe segmentation of one voxel's amplitude vector.
//!
//! The segmenter runs in four stages:
//!
//! - Growth: directions are visited in order of decreasing `|amplitude|` and
//!   grown into sign-homogeneous lobes over the catalogue's adjacency graph,
//!   merging lobes whose connecting saddle is shallow (see `growth`).
//! - Finalization: every surviving lobe is finalized exactly once.
//! - Significance filtering: negative lobes provide reference values (largest
//!   integral, mean peak) and are never emitted. A positive lobe is dropped
//!   when its peak is below the absolute threshold, its integral is below
//!   `min_integral_ratio_to_negative` times the largest negative integral, or
//!   its peak does not exceed `min_peak_ratio_to_negative_mean` times the mean
//!   negative peak.
//! - Optional outputs: a null lobe holding every direction outside the
//!   retained lobes, a direction→lobe lookup table, and dilation of that table
//!   so every direction maps to its nearest retained lobe.
//!
//! Options are validated when the segmenter is built and cannot change
//! afterwards. Segmentation touches no shared mutable state, so one segmenter
//! may be used from many threads at once.

mod growth;
mod lookup;
mod options;

pub use lookup::dilate;
pub use options::{
    SegmenterOptions, MERGE_RATIO_DEFAULT, PEAK_VALUE_THRESHOLD_DEFAULT,
    RATIO_TO_NEGATIVE_LOBE_INTEGRAL_DEFAULT, RATIO_TO_NEGATIVE_LOBE_MEAN_PEAK_DEFAULT,
};

use crate::directions::DirectionSet;
use crate::error::{Result, SegmentError};
use crate::lobe::{Lobe, LobeCollection, LookupTable, VoxelCoord};
use log::trace;

/// Segments amplitude vectors sampled on a fixed catalogue.
#[derive(Clone, Debug)]
pub struct Segmenter<'a> {
    dirs: &'a DirectionSet,
    options: SegmenterOptions,
}

/// Reference values derived from the negative lobes of a voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct NegativeReference {
    max_integral: f32,
    mean_peak: f32,
}

impl<'a> Segmenter<'a> {
    pub fn new(dirs: &'a DirectionSet, options: SegmenterOptions) -> Result<Self> {
        options.validate()?;
        if dirs.is_empty() {
            return Err(SegmentError::Directions(
                "cannot segment on an empty catalogue".to_string(),
            ));
        }
        Ok(Self { dirs, options })
    }

    pub fn options(&self) -> &SegmenterOptions {
        &self.options
    }

    pub fn directions(&self) -> &'a DirectionSet {
        self.dirs
    }

    /// Segment one voxel. `amplitudes` holds one value per catalogue
    /// direction; NaN samples are treated as zero.
    pub fn segment(&self, amplitudes: &[f32], vox: VoxelCoord) -> Result<LobeCollection> {
        let n = self.dirs.len();
        if amplitudes.len() != n {
            return Err(SegmentError::InputShape {
                expected: n,
                found: amplitudes.len(),
            });
        }
        let cleaned: Vec<f32>;
        let amplitudes = if amplitudes.iter().any(|v| v.is_nan()) {
            cleaned = amplitudes
                .iter()
                .map(|&v| if v.is_nan() { 0.0 } else { v })
                .collect();
            &cleaned[..]
        } else {
            amplitudes
        };

        let mut grown = growth::grow(self.dirs, amplitudes, self.options.merge_ratio);
        for (lobe, &alive) in grown.lobes.iter_mut().zip(&grown.alive) {
            if alive {
                lobe.finalize();
            }
        }

        let reference = negative_reference(grown.live().map(|(_, l)| l));
        let mut out = LobeCollection::new(vox);
        let mut index_of: Vec<Option<usize>> = vec![None; grown.lobes.len()];
        for (id, lobe) in grown.lobes.into_iter().enumerate() {
            if grown.alive[id] && self.is_significant(&lobe, &reference) {
                index_of[id] = Some(out.lobes.len());
                out.lobes.push(lobe);
            }
        }

        let null_index = if self.options.create_null_lobe() {
            let mut covered = self.dirs.empty_mask();
            for lobe in &out.lobes {
                covered |= lobe.mask();
            }
            out.lobes.push(Lobe::null(covered.complement()));
            Some(out.lobes.len() - 1)
        } else {
            None
        };

        if self.options.create_lookup_table() {
            let entries = grown
                .owner
                .iter()
                .map(|owner| owner.and_then(|id| index_of[id]).or(null_index))
                .collect();
            let mut lut = LookupTable::from_entries(entries);
            if self.options.dilate_lookup_table() {
                dilate(self.dirs, &mut lut);
            }
            out.lut = Some(lut);
        }

        trace!(
            "voxel {:?}: {} lobes retained (max negative integral {:.4}, mean negative peak {:.4})",
            vox,
            out.len(),
            reference.max_integral,
            reference.mean_peak
        );
        Ok(out)
    }

    /// Segment many voxels; in parallel when the `parallel` feature is enabled.
    pub fn segment_batch(&self, voxels: &[(VoxelCoord, Vec<f32>)]) -> Result<Vec<LobeCollection>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            voxels
                .par_iter()
                .map(|(vox, amps)| self.segment(amps, *vox))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            voxels
                .iter()
                .map(|(vox, amps)| self.segment(amps, *vox))
                .collect()
        }
    }

    fn is_significant(&self, lobe: &Lobe, reference: &NegativeReference) -> bool {
        if lobe.is_negative() {
            return false;
        }
        let peak = lobe.peak_value();
        let o = &self.options;
        !(peak < o.peak_value_threshold
            || lobe.integral() < o.min_integral_ratio_to_negative * reference.max_integral
            || peak <= o.min_peak_ratio_to_negative_mean * reference.mean_peak)
    }
}

fn negative_reference<'l>(lobes: impl Iterator<Item = &'l Lobe>) -> NegativeReference {
    let mut max_integral = 0.0f32;
    let mut peak_sum = 0.0f32;
    let mut count = 0usize;
    for lobe in lobes.filter(|l| l.is_negative()) {
        max_integral = max_integral.max(lobe.integral());
        peak_sum += lobe.peak_value();
        count += 1;
    }
    NegativeReference {
        max_integral,
        mean_peak: if count > 0 {
            peak_sum / count as f32
        } else {
            0.0
        },
    }
}
