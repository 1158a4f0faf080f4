//! Error types shared across the crate.
//!
//! Configuration and input-shape problems are reported as [`SegmentError`].
//! Violated preconditions on lobes (wrong sign, double finalization) are
//! programming errors and panic instead.

use std::path::PathBuf;
use thiserror::Error;

/// Incompatible or out-of-range segmenter settings.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("options 'create_null_lobe' and 'dilate_lookup_table' are mutually exclusive")]
    NullLobeWithDilation,
    #[error("'create_lookup_table' must be set in order for lookup tables to be dilated")]
    DilationWithoutLookup,
    #[error("parameter '{name}' must be finite and non-negative, got {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("invalid segmenter configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("coefficient vector has {found} entries, expected {expected}")]
    InputShape { expected: usize, found: usize },
    #[error("{0} is not a valid number of even-degree spherical harmonic coefficients")]
    InvalidShCount(usize),
    #[error("malformed direction set: {0}")]
    Directions(String),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("pipeline stage '{stage}' failed: {message}")]
    Stage { stage: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, SegmentError>;
