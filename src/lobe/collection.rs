use super::Lobe;
use crate::directions::DirectionSet;
use nalgebra::Vector3;

/// Grid coordinate of a voxel, x fastest.
pub type VoxelCoord = [usize; 3];

/// Per-direction index into a [`LobeCollection`]; `None` means unassigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTable {
    entries: Vec<Option<usize>>,
}

impl LookupTable {
    /// Table over `len` directions with every entry unassigned.
    pub fn unassigned(len: usize) -> Self {
        Self {
            entries: vec![None; len],
        }
    }

    pub fn from_entries(entries: Vec<Option<usize>>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn get(&self, dir: usize) -> Option<usize> {
        self.entries[dir]
    }

    #[inline]
    pub fn set(&mut self, dir: usize, lobe: Option<usize>) {
        self.entries[dir] = lobe;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Option<usize>] {
        &self.entries
    }

    pub fn unassigned_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_none()).count()
    }

    /// True when every direction maps to a lobe.
    pub fn is_total(&self) -> bool {
        self.entries.iter().all(Option::is_some)
    }
}

/// Finalized lobes of one voxel, in emission order, with an optional
/// direction lookup table.
#[derive(Clone, Debug)]
pub struct LobeCollection {
    pub vox: VoxelCoord,
    pub lobes: Vec<Lobe>,
    pub lut: Option<LookupTable>,
}

impl LobeCollection {
    pub fn new(vox: VoxelCoord) -> Self {
        Self {
            vox,
            lobes: Vec::new(),
            lut: None,
        }
    }

    pub fn len(&self) -> usize {
        self.lobes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lobe> {
        self.lobes.iter()
    }

    /// Lobe assigned to catalogue direction `dir` by the lookup table.
    pub fn lobe_for_direction(&self, dir: usize) -> Option<&Lobe> {
        let index = self.lut.as_ref()?.get(dir)?;
        self.lobes.get(index)
    }

    /// Lobe assigned to the catalogue direction nearest to `v`.
    pub fn lobe_nearest(&self, dirs: &DirectionSet, v: &Vector3<f32>) -> Option<&Lobe> {
        self.lobe_for_direction(dirs.nearest(v)?)
    }

    /// Sum of lobe integrals.
    pub fn total_integral(&self) -> f32 {
        self.lobes.iter().map(Lobe::integral).sum()
    }
}

impl<'a> IntoIterator for &'a LobeCollection {
    type Item = &'a Lobe;
    type IntoIter = std::slice::Iter<'a, Lobe>;

    fn into_iter(self) -> Self::IntoIter {
        self.lobes.iter()
    }
}
