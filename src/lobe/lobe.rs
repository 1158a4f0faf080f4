use crate::directions::{DirectionMask, DirectionSet};
use nalgebra::Vector3;
use std::f32::consts::PI;

/// One sign-homogeneous cluster of catalogue directions.
///
/// A lobe is live while it grows (`add`, `merge`) and becomes read-only once
/// [`Lobe::finalize`] has run. Mutating a finalized lobe, adding a value of the
/// wrong sign, or finalizing twice are caller bugs and panic.
#[derive(Clone, Debug)]
pub struct Lobe {
    mask: DirectionMask,
    values: Vec<f32>,
    peak_dir_bin: Option<usize>,
    peak_value: f32,
    peak_dir: Vector3<f32>,
    mean_dir: Vector3<f32>,
    integral: f32,
    negative: bool,
    finalized: bool,
}

impl Lobe {
    /// New lobe holding the single direction `seed`. The sign of `value`
    /// (with zero counted as negative) fixes the sign of the lobe.
    pub fn seed(dirs: &DirectionSet, seed: usize, value: f32) -> Self {
        let mut mask = dirs.empty_mask();
        mask.insert(seed);
        let mut values = vec![0.0; dirs.len()];
        values[seed] = value;
        let peak_dir = *dirs.dir(seed);
        Self {
            mask,
            values,
            peak_dir_bin: Some(seed),
            peak_value: value.abs(),
            peak_dir,
            mean_dir: peak_dir * value,
            integral: value.abs(),
            negative: value <= 0.0,
            finalized: false,
        }
    }

    /// Zero-size lobe covering `mask`, used to collect every direction not
    /// claimed by a retained lobe. Created already finalized.
    pub fn null(mask: DirectionMask) -> Self {
        let n = mask.len();
        Self {
            mask,
            values: vec![0.0; n],
            peak_dir_bin: None,
            peak_value: 0.0,
            peak_dir: Vector3::zeros(),
            mean_dir: Vector3::zeros(),
            integral: 0.0,
            negative: false,
            finalized: true,
        }
    }

    /// Extend the lobe by one direction of matching sign.
    pub fn add(&mut self, dirs: &DirectionSet, bin: usize, value: f32) {
        assert!(!self.finalized, "cannot add to a finalized lobe");
        assert!(
            (value <= 0.0 && self.negative) || (value >= 0.0 && !self.negative),
            "amplitude {value} does not match lobe sign (negative={})",
            self.negative
        );
        self.mask.insert(bin);
        self.values[bin] = value;
        let dir = dirs.dir(bin);
        if !self.negative && value > self.peak_value {
            self.peak_dir_bin = Some(bin);
            self.peak_value = value;
            self.peak_dir = *dir;
        }
        let multiplier = if self.peak_dir.dot(dir) > 0.0 { 1.0 } else { -1.0 };
        self.mean_dir += dir * (multiplier * value);
        self.integral += value.abs();
    }

    /// Absorb another live lobe of the same sign.
    pub fn merge(&mut self, other: &Lobe) {
        assert!(
            !self.finalized && !other.finalized,
            "cannot merge finalized lobes"
        );
        assert_eq!(
            self.negative, other.negative,
            "cannot merge lobes of opposite sign"
        );
        self.mask |= &other.mask;
        for bin in other.mask.iter() {
            self.values[bin] += other.values[bin];
        }
        if other.peak_value > self.peak_value {
            self.peak_dir_bin = other.peak_dir_bin;
            self.peak_value = other.peak_value;
            self.peak_dir = other.peak_dir;
        }
        let multiplier = if self.mean_dir.dot(&other.mean_dir) > 0.0 {
            1.0
        } else {
            -1.0
        };
        self.mean_dir += other.mean_dir * multiplier;
        self.integral += other.integral;
    }

    /// Scale the integral to a solid-angle estimate and normalize the mean
    /// direction. Must run exactly once.
    pub fn finalize(&mut self) {
        assert!(!self.finalized, "lobe finalized twice");
        // 2π sr: the catalogue covers a half-sphere
        self.integral *= 2.0 * PI / self.mask.len() as f32;
        let norm = self.mean_dir.norm();
        if norm > 0.0 {
            self.mean_dir /= norm;
        }
        self.finalized = true;
    }

    /// Replace the coarse peak with an externally refined estimate.
    pub fn revise_peak(&mut self, dir: Vector3<f32>, value: f32) {
        assert!(!self.negative, "cannot revise the peak of a negative lobe");
        self.peak_dir = dir;
        self.peak_value = value;
    }

    /// Replace the mean direction with an externally refined estimate.
    pub fn revise_mean_dir(&mut self, dir: Vector3<f32>) {
        assert!(
            !self.negative,
            "cannot revise the mean direction of a negative lobe"
        );
        self.mean_dir = dir;
    }

    pub fn mask(&self) -> &DirectionMask {
        &self.mask
    }

    /// Per-direction amplitudes; zero outside the mask.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Catalogue index of the peak; `None` for the null lobe.
    pub fn peak_dir_bin(&self) -> Option<usize> {
        self.peak_dir_bin
    }

    /// Absolute amplitude at the peak.
    pub fn peak_value(&self) -> f32 {
        self.peak_value
    }

    pub fn peak_dir(&self) -> &Vector3<f32> {
        &self.peak_dir
    }

    /// Weighted mean direction; unit length after finalization (zero for the
    /// null lobe).
    pub fn mean_dir(&self) -> &Vector3<f32> {
        &self.mean_dir
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of member directions.
    pub fn size(&self) -> usize {
        self.mask.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> DirectionSet {
        let dirs = (0..n)
            .map(|i| {
                let a = std::f32::consts::PI * i as f32 / n as f32;
                Vector3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let adjacency = (0..n).map(|i| vec![(i + n - 1) % n, (i + 1) % n]).collect();
        DirectionSet::with_adjacency(dirs, adjacency).unwrap()
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn seed_and_add_accumulate() {
        let dirs = ring(8);
        let mut lobe = Lobe::seed(&dirs, 2, 0.8);
        lobe.add(&dirs, 3, 0.5);
        lobe.add(&dirs, 1, 0.4);
        assert!(!lobe.is_negative());
        assert_eq!(lobe.size(), 3);
        assert_eq!(lobe.peak_dir_bin(), Some(2));
        assert!(approx_eq(lobe.peak_value(), 0.8));
        assert!(approx_eq(lobe.integral(), 1.7));
        assert!(approx_eq(lobe.values()[3], 0.5));
        assert!(approx_eq(lobe.values()[0], 0.0));

        lobe.finalize();
        assert!(approx_eq(lobe.integral(), 1.7 * 2.0 * PI / 8.0));
        assert!(approx_eq(lobe.mean_dir().norm(), 1.0));
        // symmetric contributions around the peak keep the mean near it
        assert!(lobe.mean_dir().dot(dirs.dir(2)) > 0.99);
    }

    #[test]
    fn larger_later_value_moves_positive_peak() {
        let dirs = ring(6);
        let mut lobe = Lobe::seed(&dirs, 0, 0.3);
        lobe.add(&dirs, 1, 0.9);
        assert_eq!(lobe.peak_dir_bin(), Some(1));
        assert!(approx_eq(lobe.peak_value(), 0.9));
    }

    #[test]
    fn negative_lobe_keeps_seed_peak() {
        let dirs = ring(6);
        let mut lobe = Lobe::seed(&dirs, 0, -0.3);
        lobe.add(&dirs, 1, -0.9);
        assert!(lobe.is_negative());
        assert_eq!(lobe.peak_dir_bin(), Some(0));
        assert!(approx_eq(lobe.peak_value(), 0.3));
        assert!(approx_eq(lobe.integral(), 1.2));
    }

    #[test]
    fn antipodal_neighbour_does_not_cancel_mean() {
        // directions 0 and n-1 are neighbours across the wrap-around, where
        // the stored vectors point almost opposite ways
        let dirs = ring(8);
        let mut lobe = Lobe::seed(&dirs, 0, 1.0);
        lobe.add(&dirs, 7, 1.0);
        lobe.finalize();
        let expected = (dirs.dir(0) - dirs.dir(7)).normalize();
        assert!(lobe.mean_dir().dot(&expected) > 0.999);
    }

    #[test]
    fn merge_is_commutative_in_membership_and_integral() {
        let dirs = ring(10);
        let build = |seed: usize, value: f32, extra: &[(usize, f32)]| {
            let mut lobe = Lobe::seed(&dirs, seed, value);
            for &(bin, v) in extra {
                lobe.add(&dirs, bin, v);
            }
            lobe
        };
        let a = build(1, 0.9, &[(2, 0.4)]);
        let b = build(5, 0.7, &[(4, 0.3), (6, 0.2)]);

        let mut ab = a.clone();
        ab.merge(&b);
        ab.finalize();
        let mut ba = b.clone();
        ba.merge(&a);
        ba.finalize();

        assert_eq!(ab.mask(), ba.mask());
        assert!(approx_eq(ab.integral(), ba.integral()));
        assert_eq!(ab.peak_dir_bin(), Some(1));
        assert_eq!(ba.peak_dir_bin(), Some(1));
        assert_eq!(ab.size(), 5);
    }

    #[test]
    fn null_lobe_is_empty_and_final() {
        let dirs = ring(5);
        let mut mask = dirs.empty_mask();
        mask.insert(3);
        let null = Lobe::null(mask);
        assert!(null.is_finalized());
        assert_eq!(null.peak_dir_bin(), None);
        assert_eq!(null.integral(), 0.0);
        assert_eq!(null.size(), 1);
    }

    #[test]
    fn revise_peak_on_positive_lobe() {
        let dirs = ring(6);
        let mut lobe = Lobe::seed(&dirs, 0, 0.5);
        lobe.finalize();
        lobe.revise_peak(Vector3::z(), 0.55);
        lobe.revise_mean_dir(Vector3::z());
        assert!(approx_eq(lobe.peak_value(), 0.55));
        assert_eq!(*lobe.mean_dir(), Vector3::z());
    }

    #[test]
    #[should_panic(expected = "finalized twice")]
    fn double_finalize_panics() {
        let dirs = ring(4);
        let mut lobe = Lobe::seed(&dirs, 0, 1.0);
        lobe.finalize();
        lobe.finalize();
    }

    #[test]
    #[should_panic(expected = "does not match lobe sign")]
    fn adding_wrong_sign_panics() {
        let dirs = ring(4);
        let mut lobe = Lobe::seed(&dirs, 0, 1.0);
        lobe.add(&dirs, 1, -0.5);
    }

    #[test]
    #[should_panic(expected = "opposite sign")]
    fn merging_opposite_signs_panics() {
        let dirs = ring(4);
        let mut pos = Lobe::seed(&dirs, 0, 1.0);
        let neg = Lobe::seed(&dirs, 2, -1.0);
        pos.merge(&neg);
    }

    #[test]
    #[should_panic(expected = "negative lobe")]
    fn revising_negative_peak_panics() {
        let dirs = ring(4);
        let mut lobe = Lobe::seed(&dirs, 0, -1.0);
        lobe.revise_peak(Vector3::x(), 1.0);
    }

    #[test]
    #[should_panic(expected = "finalized lobe")]
    fn adding_after_finalize_panics() {
        let dirs = ring(4);
        let mut lobe = Lobe::seed(&dirs, 0, 1.0);
        lobe.finalize();
        lobe.add(&dirs, 1, 0.5);
    }
}
