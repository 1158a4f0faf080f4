use super::{VoxelCoefficients, VoxelSource};
use crate::error::{Result, SegmentError};
use crate::lobe::VoxelCoord;
use serde::Deserialize;

/// In-memory 3D grid of coefficient vectors, voxel-major with x fastest,
/// plus an optional voxel mask.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "VolumeFile")]
pub struct CoefficientVolume {
    dims: [usize; 3],
    coefficients: usize,
    data: Vec<f32>,
    mask: Option<Vec<bool>>,
}

/// On-disk JSON layout, validated into a [`CoefficientVolume`].
#[derive(Deserialize)]
struct VolumeFile {
    dims: [usize; 3],
    coefficients: usize,
    data: Vec<f32>,
    #[serde(default)]
    mask: Option<Vec<bool>>,
}

impl TryFrom<VolumeFile> for CoefficientVolume {
    type Error = SegmentError;

    fn try_from(file: VolumeFile) -> Result<Self> {
        let volume = Self::new(file.dims, file.coefficients, file.data)?;
        match file.mask {
            Some(mask) => volume.with_mask(mask),
            None => Ok(volume),
        }
    }
}

impl CoefficientVolume {
    pub fn new(dims: [usize; 3], coefficients: usize, data: Vec<f32>) -> Result<Self> {
        let expected = dims.iter().product::<usize>() * coefficients;
        if data.len() != expected {
            return Err(SegmentError::InputShape {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            dims,
            coefficients,
            data,
            mask: None,
        })
    }

    /// Restrict traversal to voxels where `mask` is true.
    pub fn with_mask(mut self, mask: Vec<bool>) -> Result<Self> {
        if mask.len() != self.voxel_count() {
            return Err(SegmentError::InputShape {
                expected: self.voxel_count(),
                found: mask.len(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn coefficient_count(&self) -> usize {
        self.coefficients
    }

    pub fn voxel_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Voxels the source will visit.
    pub fn masked_voxel_count(&self) -> usize {
        match &self.mask {
            Some(mask) => mask.iter().filter(|&&m| m).count(),
            None => self.voxel_count(),
        }
    }

    pub fn coords(&self, index: usize) -> VoxelCoord {
        let [nx, ny, _] = self.dims;
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    pub fn voxel(&self, index: usize) -> &[f32] {
        let start = index * self.coefficients;
        &self.data[start..start + self.coefficients]
    }

    fn included(&self, index: usize) -> bool {
        self.mask.as_ref().map_or(true, |m| m[index])
    }

    /// Single-pass traversal over the unmasked voxels.
    pub fn source(&self) -> VolumeSource<'_> {
        VolumeSource {
            volume: self,
            next: 0,
        }
    }
}

/// Streams a [`CoefficientVolume`] in x-fastest order, skipping masked voxels.
#[derive(Debug)]
pub struct VolumeSource<'a> {
    volume: &'a CoefficientVolume,
    next: usize,
}

impl VoxelSource for VolumeSource<'_> {
    fn coefficient_count(&self) -> usize {
        self.volume.coefficients
    }

    fn next_voxel(&mut self) -> Result<Option<VoxelCoefficients>> {
        while self.next < self.volume.voxel_count() {
            let index = self.next;
            self.next += 1;
            if self.volume.included(index) {
                return Ok(Some(VoxelCoefficients {
                    vox: self.volume.coords(index),
                    coefficients: self.volume.voxel(index).to_vec(),
                }));
            }
        }
        Ok(None)
    }
}
