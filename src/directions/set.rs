use super::DirectionMask;
use crate::error::{Result, SegmentError};
use nalgebra::Vector3;

/// Two directions are neighbours when their separation is at most this multiple
/// of the larger of their nearest-neighbour separations.
const ADJACENCY_SCALE: f32 = 1.5;

/// Fixed catalogue of unit directions tessellating the half-sphere, with a
/// symmetric adjacency graph.
///
/// Directions are treated as axes: `d` and `-d` are the same sample, so every
/// angular comparison uses `|dot|`. The set is immutable once built and is
/// shared read-only by every voxel and worker.
#[derive(Clone, Debug)]
pub struct DirectionSet {
    dirs: Vec<Vector3<f32>>,
    adjacency: Vec<Vec<usize>>,
}

impl DirectionSet {
    /// Build from arbitrary (non-zero) vectors, deriving the adjacency graph.
    pub fn new(dirs: Vec<Vector3<f32>>) -> Result<Self> {
        let dirs = normalize_all(dirs)?;
        let adjacency = derive_adjacency(&dirs);
        Ok(Self { dirs, adjacency })
    }

    /// Build from vectors and an explicit adjacency relation.
    ///
    /// The relation must be symmetric, in range and free of self-loops.
    pub fn with_adjacency(dirs: Vec<Vector3<f32>>, mut adjacency: Vec<Vec<usize>>) -> Result<Self> {
        let dirs = normalize_all(dirs)?;
        if adjacency.len() != dirs.len() {
            return Err(SegmentError::Directions(format!(
                "adjacency has {} rows for {} directions",
                adjacency.len(),
                dirs.len()
            )));
        }
        for (i, row) in adjacency.iter_mut().enumerate() {
            row.sort_unstable();
            row.dedup();
            if let Some(&bad) = row.iter().find(|&&j| j >= dirs.len() || j == i) {
                return Err(SegmentError::Directions(format!(
                    "direction {i} has invalid neighbour {bad}"
                )));
            }
        }
        for (i, row) in adjacency.iter().enumerate() {
            for &j in row {
                if adjacency[j].binary_search(&i).is_err() {
                    return Err(SegmentError::Directions(format!(
                        "adjacency is not symmetric between {i} and {j}"
                    )));
                }
            }
        }
        Ok(Self { dirs, adjacency })
    }

    /// Build from `[azimuth, elevation]` pairs in radians, elevation measured
    /// from the z axis.
    pub fn from_azimuth_elevation(pairs: &[[f32; 2]]) -> Result<Self> {
        let dirs = pairs
            .iter()
            .map(|&[az, el]| Vector3::new(el.sin() * az.cos(), el.sin() * az.sin(), el.cos()))
            .collect();
        Self::new(dirs)
    }

    /// Quasi-uniform set of `count` directions on the upper half-sphere
    /// (Fibonacci lattice).
    pub fn half_sphere(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(SegmentError::Directions(
                "internal direction set needs at least one direction".to_string(),
            ));
        }
        let golden = std::f32::consts::PI * (3.0 - 5f32.sqrt());
        let n = count as f32;
        let dirs = (0..count)
            .map(|i| {
                let z = 1.0 - (i as f32 + 0.5) / n;
                let r = (1.0 - z * z).max(0.0).sqrt();
                let phi = golden * i as f32;
                Vector3::new(r * phi.cos(), r * phi.sin(), z)
            })
            .collect();
        Self::new(dirs)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    #[inline]
    pub fn dir(&self, index: usize) -> &Vector3<f32> {
        &self.dirs[index]
    }

    pub fn dirs(&self) -> &[Vector3<f32>] {
        &self.dirs
    }

    /// Graph neighbours of `index`, sorted ascending.
    #[inline]
    pub fn adjacent(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }

    /// True when any neighbour of `index` is a member of `mask`.
    pub fn touches(&self, mask: &DirectionMask, index: usize) -> bool {
        self.adjacency[index].iter().any(|&n| mask.contains(n))
    }

    /// Catalogue direction closest to `v` (sign of `v` ignored).
    pub fn nearest(&self, v: &Vector3<f32>) -> Option<usize> {
        let mut best = None;
        let mut best_dot = f32::NEG_INFINITY;
        for (i, d) in self.dirs.iter().enumerate() {
            let dot = d.dot(v).abs();
            if dot > best_dot {
                best_dot = dot;
                best = Some(i);
            }
        }
        best
    }

    /// An empty mask sized for this catalogue.
    pub fn empty_mask(&self) -> DirectionMask {
        DirectionMask::new(self.len())
    }
}

fn normalize_all(dirs: Vec<Vector3<f32>>) -> Result<Vec<Vector3<f32>>> {
    if dirs.is_empty() {
        return Err(SegmentError::Directions("no directions supplied".to_string()));
    }
    dirs.into_iter()
        .enumerate()
        .map(|(i, d)| {
            let norm = d.norm();
            if !norm.is_finite() || norm < 1e-6 {
                Err(SegmentError::Directions(format!(
                    "direction {i} has invalid length {norm}"
                )))
            } else {
                Ok(d / norm)
            }
        })
        .collect()
}

#[inline]
fn axis_angle(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    a.dot(b).abs().min(1.0).acos()
}

fn derive_adjacency(dirs: &[Vector3<f32>]) -> Vec<Vec<usize>> {
    let n = dirs.len();
    let mut nearest = vec![f32::INFINITY; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let angle = axis_angle(&dirs[i], &dirs[j]);
            nearest[i] = nearest[i].min(angle);
            nearest[j] = nearest[j].min(angle);
        }
    }
    let mut adjacency = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let angle = axis_angle(&dirs[i], &dirs[j]);
            if angle <= ADJACENCY_SCALE * nearest[i].max(nearest[j]) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }
    for row in &mut adjacency {
        row.sort_unstable();
    }
    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn connected(set: &DirectionSet) -> bool {
        let mut seen = vec![false; set.len()];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        while let Some(d) = queue.pop_front() {
            for &n in set.adjacent(d) {
                if !seen[n] {
                    seen[n] = true;
                    queue.push_back(n);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    #[test]
    fn half_sphere_graph_is_symmetric_and_connected() {
        let set = DirectionSet::half_sphere(300).unwrap();
        assert_eq!(set.len(), 300);
        for i in 0..set.len() {
            assert!((set.dir(i).norm() - 1.0).abs() < 1e-5);
            assert!(
                set.adjacent(i).len() >= 2,
                "direction {i} has only {} neighbours",
                set.adjacent(i).len()
            );
            for &j in set.adjacent(i) {
                assert!(set.is_adjacent(j, i));
            }
        }
        assert!(connected(&set));
    }

    #[test]
    fn nearest_ignores_sign() {
        let set = DirectionSet::half_sphere(120).unwrap();
        for i in [0, 17, 64, 119] {
            assert_eq!(set.nearest(set.dir(i)), Some(i));
            assert_eq!(set.nearest(&(-set.dir(i))), Some(i));
        }
    }

    #[test]
    fn explicit_adjacency_must_be_symmetric() {
        let dirs = vec![Vector3::x(), Vector3::y(), Vector3::z()];
        let err = DirectionSet::with_adjacency(dirs.clone(), vec![vec![1], vec![], vec![]]);
        assert!(matches!(err, Err(SegmentError::Directions(_))));
        let ok = DirectionSet::with_adjacency(dirs, vec![vec![1], vec![0, 2], vec![1]]).unwrap();
        assert!(ok.is_adjacent(1, 2));
        assert!(!ok.is_adjacent(0, 2));
    }

    #[test]
    fn zero_vector_is_rejected() {
        let err = DirectionSet::new(vec![Vector3::x(), Vector3::zeros()]);
        assert!(matches!(err, Err(SegmentError::Directions(_))));
    }

    #[test]
    fn azimuth_elevation_matches_axes() {
        let set = DirectionSet::from_azimuth_elevation(&[
            [0.0, 0.0],
            [0.0, std::f32::consts::FRAC_PI_2],
        ])
        .unwrap();
        assert!((set.dir(0) - Vector3::z()).norm() < 1e-6);
        assert!((set.dir(1) - Vector3::x()).norm() < 1e-6);
    }
}
