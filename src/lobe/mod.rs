//! Lobe data model.
//!
//! A [`Lobe`] accumulates one sign-homogeneous cluster of directions while a
//! voxel is segmented: membership mask, per-direction amplitudes, running
//! peak, weighted mean direction and integral. After growth each lobe is
//! finalized once (integral scaled to steradians, mean direction normalized)
//! and becomes read-only.
//!
//! A [`LobeCollection`] is the per-voxel result handed to the consumer,
//! optionally carrying a [`LookupTable`] from catalogue direction to lobe.

mod collection;
mod lobe;

pub use collection::{LobeCollection, LookupTable, VoxelCoord};
pub use lobe::Lobe;
