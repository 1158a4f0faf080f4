//! Even-degree real spherical harmonic bookkeeping and amplitude sampling.
//!
//! Only the size↔degree relationship lives here; the basis transform itself
//! is supplied precomputed (one row per catalogue direction) and wrapped by
//! [`AmplitudeSampler`].

mod sampler;

pub use sampler::AmplitudeSampler;

use crate::error::{Result, SegmentError};

/// Number of coefficients of an even-degree basis up to degree `lmax`.
#[inline]
pub fn n_for_l(lmax: usize) -> usize {
    (lmax + 1) * (lmax + 2) / 2
}

/// Largest even degree whose basis fits in `n` coefficients.
#[inline]
pub fn l_for_n(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    2 * (((1.0 + 8.0 * n as f64).sqrt() - 3.0) / 4.0).floor() as usize
}

/// Degree implied by exactly `n` coefficients, or an error when `n` is not a
/// complete even-degree basis size (1, 6, 15, 28, 45, ...).
pub fn lmax_for_count(n: usize) -> Result<usize> {
    let lmax = l_for_n(n);
    if n == 0 || n_for_l(lmax) != n {
        return Err(SegmentError::InvalidShCount(n));
    }
    Ok(lmax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_degree_relationship() {
        for (lmax, n) in [(0, 1), (2, 6), (4, 15), (6, 28), (8, 45), (10, 66)] {
            assert_eq!(n_for_l(lmax), n);
            assert_eq!(l_for_n(n), lmax);
            assert_eq!(lmax_for_count(n).unwrap(), lmax);
        }
    }

    #[test]
    fn incomplete_basis_is_rejected() {
        for n in [0, 2, 7, 16, 44] {
            assert!(matches!(
                lmax_for_count(n),
                Err(SegmentError::InvalidShCount(m)) if m == n
            ));
        }
        assert_eq!(l_for_n(16), 4);
    }
}
