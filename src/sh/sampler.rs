use super::lmax_for_count;
use crate::directions::DirectionSet;
use crate::error::{Result, SegmentError};
use nalgebra::{DMatrix, DVector};

/// Precomputed linear map from coefficients to per-direction amplitudes:
/// `amplitudes = transform * coefficients`.
///
/// Immutable after construction, so a single sampler is shared by reference
/// across all workers; each worker owns its output buffer.
#[derive(Clone, Debug)]
pub struct AmplitudeSampler {
    transform: DMatrix<f32>,
    lmax: usize,
}

impl AmplitudeSampler {
    /// Wrap a transform with one row per direction and one column per
    /// coefficient. The column count must be a complete even-degree basis.
    pub fn new(transform: DMatrix<f32>) -> Result<Self> {
        let lmax = lmax_for_count(transform.ncols())?;
        Ok(Self { transform, lmax })
    }

    /// Like [`AmplitudeSampler::new`], also checking the row count against the
    /// catalogue.
    pub fn for_directions(dirs: &DirectionSet, transform: DMatrix<f32>) -> Result<Self> {
        if transform.nrows() != dirs.len() {
            return Err(SegmentError::InputShape {
                expected: dirs.len(),
                found: transform.nrows(),
            });
        }
        Self::new(transform)
    }

    /// Build from row-major rows, e.g. as loaded from JSON.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(SegmentError::InputShape {
                expected: ncols,
                found: bad.len(),
            });
        }
        let transform = DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]);
        Self::new(transform)
    }

    #[inline]
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    #[inline]
    pub fn coefficient_count(&self) -> usize {
        self.transform.ncols()
    }

    #[inline]
    pub fn direction_count(&self) -> usize {
        self.transform.nrows()
    }

    /// Check that a coefficient vector matches the basis size.
    pub fn check_len(&self, found: usize) -> Result<()> {
        if found != self.coefficient_count() {
            return Err(SegmentError::InputShape {
                expected: self.coefficient_count(),
                found,
            });
        }
        Ok(())
    }

    /// Evaluate amplitudes into a caller-owned buffer (resized if needed).
    pub fn sample_into(&self, coefficients: &[f32], out: &mut DVector<f32>) -> Result<()> {
        self.check_len(coefficients.len())?;
        if out.len() != self.direction_count() {
            *out = DVector::zeros(self.direction_count());
        }
        let coefs = DVector::from_column_slice(coefficients);
        self.transform.mul_to(&coefs, out);
        Ok(())
    }

    pub fn sample(&self, coefficients: &[f32]) -> Result<DVector<f32>> {
        let mut out = DVector::zeros(self.direction_count());
        self.sample_into(coefficients, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_passes_coefficients_through() {
        let sampler = AmplitudeSampler::new(DMatrix::identity(6, 6)).unwrap();
        assert_eq!(sampler.lmax(), 2);
        let amps = sampler.sample(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(amps.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn wrong_coefficient_count_is_a_shape_error() {
        let sampler = AmplitudeSampler::new(DMatrix::from_element(4, 15, 0.5)).unwrap();
        let err = sampler.sample(&[0.0; 6]).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::InputShape {
                expected: 15,
                found: 6
            }
        ));
    }

    #[test]
    fn transform_must_have_complete_basis() {
        assert!(matches!(
            AmplitudeSampler::new(DMatrix::zeros(10, 7)),
            Err(SegmentError::InvalidShCount(7))
        ));
    }

    #[test]
    fn rows_must_match_catalogue() {
        let dirs = DirectionSet::half_sphere(12).unwrap();
        let err = AmplitudeSampler::for_directions(&dirs, DMatrix::zeros(11, 6)).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::InputShape {
                expected: 12,
                found: 11
            }
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0; 6], vec![1.0; 5]];
        assert!(AmplitudeSampler::from_rows(&rows).is_err());
        let ok = AmplitudeSampler::from_rows(&[vec![1.0; 6], vec![0.5; 6]]).unwrap();
        let amps = ok.sample(&[1.0; 6]).unwrap();
        assert!((amps[0] - 6.0).abs() < 1e-6 && (amps[1] - 3.0).abs() < 1e-6);
    }
}
