use std::ops::BitOrAssign;

const WORD_BITS: usize = 64;

/// Fixed-size set of catalogue directions stored as a bitset.
///
/// Used both for lobe membership and for coverage of a voxel's sphere. Two
/// masks combined with `|=` must have been created for the same catalogue
/// size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectionMask {
    words: Vec<u64>,
    len: usize,
}

impl DirectionMask {
    /// Empty mask over `len` directions.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Mask with every direction set.
    pub fn full(len: usize) -> Self {
        let mut mask = Self::new(len);
        mask.words.fill(u64::MAX);
        mask.clear_tail();
        mask
    }

    /// Number of directions in the catalogue this mask covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count() == self.len
    }

    #[inline]
    pub fn contains(&self, dir: usize) -> bool {
        debug_assert!(dir < self.len, "direction {dir} out of range {}", self.len);
        self.words[dir / WORD_BITS] & (1u64 << (dir % WORD_BITS)) != 0
    }

    #[inline]
    pub fn insert(&mut self, dir: usize) {
        debug_assert!(dir < self.len, "direction {dir} out of range {}", self.len);
        self.words[dir / WORD_BITS] |= 1u64 << (dir % WORD_BITS);
    }

    #[inline]
    pub fn remove(&mut self, dir: usize) {
        debug_assert!(dir < self.len, "direction {dir} out of range {}", self.len);
        self.words[dir / WORD_BITS] &= !(1u64 << (dir % WORD_BITS));
    }

    /// Number of member directions.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Directions not in this mask.
    pub fn complement(&self) -> Self {
        let mut out = Self {
            words: self.words.iter().map(|w| !w).collect(),
            len: self.len,
        };
        out.clear_tail();
        out
    }

    /// Iterate member directions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(wi * WORD_BITS + tz)
            })
        })
    }

    fn clear_tail(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

impl BitOrAssign<&DirectionMask> for DirectionMask {
    fn bitor_assign(&mut self, rhs: &DirectionMask) {
        assert_eq!(self.len, rhs.len, "direction masks cover different catalogues");
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a |= *b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_complement_respect_length() {
        let full = DirectionMask::full(70);
        assert_eq!(full.count(), 70);
        assert!(full.is_full());
        let empty = full.complement();
        assert!(empty.is_empty());
        assert_eq!(empty.count(), 0);
    }

    #[test]
    fn iter_yields_members_in_order() {
        let mut mask = DirectionMask::new(130);
        for d in [129, 0, 64, 63, 5] {
            mask.insert(d);
        }
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![0, 5, 63, 64, 129]);
        mask.remove(64);
        assert!(!mask.contains(64));
        assert_eq!(mask.count(), 4);
    }

    #[test]
    fn union_merges_members() {
        let mut a = DirectionMask::new(10);
        let mut b = DirectionMask::new(10);
        a.insert(1);
        b.insert(7);
        a |= &b;
        assert!(a.contains(1) && a.contains(7));
        assert_eq!(a.complement().count(), 8);
    }
}
