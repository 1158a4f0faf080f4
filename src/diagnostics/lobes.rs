use crate::lobe::{Lobe, LobeCollection};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

fn to_array(v: &Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Lobe attributes in JSON-friendly form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobeSummary {
    /// Member direction indices, ascending.
    pub directions: Vec<usize>,
    pub peak_bin: Option<usize>,
    pub peak_value: f32,
    pub peak_dir: [f32; 3],
    pub mean_dir: [f32; 3],
    pub integral: f32,
}

impl From<&Lobe> for LobeSummary {
    fn from(lobe: &Lobe) -> Self {
        Self {
            directions: lobe.mask().iter().collect(),
            peak_bin: lobe.peak_dir_bin(),
            peak_value: lobe.peak_value(),
            peak_dir: to_array(lobe.peak_dir()),
            mean_dir: to_array(lobe.mean_dir()),
            integral: lobe.integral(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub vox: [usize; 3],
    pub lobes: Vec<LobeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Vec<Option<usize>>>,
}

impl From<&LobeCollection> for CollectionSummary {
    fn from(collection: &LobeCollection) -> Self {
        Self {
            vox: collection.vox,
            lobes: collection.iter().map(LobeSummary::from).collect(),
            lookup: collection.lut.as_ref().map(|lut| lut.entries().to_vec()),
        }
    }
}
