//! Discretized sphere: the direction catalogue, direction masks and the
//! sources a catalogue can be built from.
//!
//! A [`DirectionSet`] holds N unit directions on the half-sphere together with
//! a symmetric adjacency graph. It is built once per run, then shared
//! read-only by every voxel. [`DirectionMask`] is a bitset over catalogue
//! indices used for lobe membership and sphere coverage.
//!
//! Catalogues come from one of several places (a diffusion gradient table
//! shell, rows stored in an image header, the built-in half-sphere lattice or
//! a file); see [`DirectionSource`].

mod mask;
mod scheme;
mod set;
mod source;

pub use mask::DirectionMask;
pub use scheme::{GradientScheme, Shell, BZERO_THRESHOLD, SHELL_EPSILON};
pub use set::DirectionSet;
pub use source::{directions_from_rows, DirectionSource, DirectionSourceKind};
