use super::VoxelSink;
use crate::error::Result;
use crate::lobe::LobeCollection;

/// Sink that keeps every collection in arrival order.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    pub collections: Vec<LobeCollection>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Collections reordered to traversal order (x fastest).
    pub fn into_sorted(mut self) -> Vec<LobeCollection> {
        self.collections
            .sort_by_key(|c| [c.vox[2], c.vox[1], c.vox[0]]);
        self.collections
    }
}

impl VoxelSink for CollectingSink {
    fn accept(&mut self, lobes: LobeCollection) -> Result<()> {
        self.collections.push(lobes);
        Ok(())
    }
}
