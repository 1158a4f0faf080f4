//! Region growing over the direction graph.
//!
//! Directions are visited in order of decreasing absolute amplitude. Each one
//! either seeds a new lobe, extends the single same-sign lobe it touches, or
//! sits where several same-sign lobes meet. At such a saddle the lobes are
//! merged when the amplitude is still high relative to the smaller peak;
//! otherwise the direction goes to the taller lobe and the catchments stay
//! separate.
//!
//! Lobes live in an arena indexed by creation order. Merging absorbs the
//! later lobe into the earlier one, marks the later slot dead and repoints
//! its directions, so no lobe ever moves.

use crate::directions::DirectionSet;
use crate::lobe::Lobe;

pub(crate) struct Growth {
    pub lobes: Vec<Lobe>,
    pub alive: Vec<bool>,
    /// Arena id of the lobe owning each direction.
    pub owner: Vec<Option<usize>>,
}

impl Growth {
    /// Live lobes with their arena ids, in creation order.
    pub fn live(&self) -> impl Iterator<Item = (usize, &Lobe)> + '_ {
        let alive = &self.alive;
        self.lobes
            .iter()
            .enumerate()
            .filter(move |(id, _)| alive[*id])
    }
}

/// Visit order: decreasing `|amplitude|`, ties by direction index.
pub(crate) fn visit_order(amplitudes: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..amplitudes.len()).collect();
    order.sort_by(|&a, &b| {
        amplitudes[b]
            .abs()
            .total_cmp(&amplitudes[a].abs())
            .then(a.cmp(&b))
    });
    order
}

pub(crate) fn grow(dirs: &DirectionSet, amplitudes: &[f32], merge_ratio: f32) -> Growth {
    let n = dirs.len();
    let mut growth = Growth {
        lobes: Vec::new(),
        alive: Vec::new(),
        owner: vec![None; n],
    };
    let mut touching: Vec<usize> = Vec::with_capacity(8);

    for dir in visit_order(amplitudes) {
        let value = amplitudes[dir];
        let negative = value <= 0.0;

        touching.clear();
        for &neighbour in dirs.adjacent(dir) {
            if let Some(id) = growth.owner[neighbour] {
                if growth.lobes[id].is_negative() == negative && !touching.contains(&id) {
                    touching.push(id);
                }
            }
        }
        touching.sort_unstable();

        let id = match touching.as_slice() {
            [] => {
                growth.lobes.push(Lobe::seed(dirs, dir, value));
                growth.alive.push(true);
                growth.lobes.len() - 1
            }
            &[only] => {
                growth.lobes[only].add(dirs, dir, value);
                only
            }
            candidates => {
                let min_peak = candidates
                    .iter()
                    .map(|&id| growth.lobes[id].peak_value())
                    .fold(f32::INFINITY, f32::min);
                if value.abs() >= merge_ratio * min_peak {
                    let target = candidates[0];
                    for &other in &candidates[1..] {
                        absorb(&mut growth, target, other);
                    }
                    growth.lobes[target].add(dirs, dir, value);
                    target
                } else {
                    let tallest = tallest(dirs, &growth.lobes, candidates, dir);
                    growth.lobes[tallest].add(dirs, dir, value);
                    tallest
                }
            }
        };
        growth.owner[dir] = Some(id);
    }
    growth
}

/// Merge arena slot `other` into `target` (`target < other`) and repoint the
/// directions it owned.
fn absorb(growth: &mut Growth, target: usize, other: usize) {
    debug_assert!(target < other);
    let (head, tail) = growth.lobes.split_at_mut(other);
    head[target].merge(&tail[0]);
    growth.alive[other] = false;
    for bin in growth.lobes[other].mask().iter() {
        growth.owner[bin] = Some(target);
    }
}

/// Relative tolerance under which two peaks count as equally tall.
const PEAK_TIE_TOLERANCE: f32 = 1e-6;

/// Candidate with the largest peak. Equally tall peaks go to the one whose
/// peak direction is closest to `dir`, then to the earliest lobe.
fn tallest(dirs: &DirectionSet, lobes: &[Lobe], candidates: &[usize], dir: usize) -> usize {
    let d = dirs.dir(dir);
    let closeness = |id: usize| lobes[id].peak_dir().dot(d).abs();
    let mut best = candidates[0];
    for &id in &candidates[1..] {
        let (height, best_height) = (lobes[id].peak_value(), lobes[best].peak_value());
        let tied = (height - best_height).abs() <= PEAK_TIE_TOLERANCE * height.max(best_height);
        if tied {
            if closeness(id) > closeness(best) {
                best = id;
            }
        } else if height > best_height {
            best = id;
        }
    }
    best
}
