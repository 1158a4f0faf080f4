use super::{DirectionSet, GradientScheme};
use crate::error::{Result, SegmentError};
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a direction catalogue comes from.
///
/// Each variant has exactly one construction path in [`DirectionSource::resolve`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectionSource {
    /// Directions of one shell of a diffusion gradient table. `shell: None`
    /// selects the highest b-value shell.
    DwScheme {
        scheme: GradientScheme,
        #[serde(default)]
        shell: Option<usize>,
    },
    /// Direction rows stored alongside the image (2 or 3 columns per row).
    Header { rows: Vec<Vec<f32>> },
    /// Built-in quasi-uniform half-sphere set.
    Internal { count: usize },
    /// Direction file on disk (see [`crate::io::load_direction_rows`]).
    File { path: PathBuf },
    None,
}

/// Discriminant of [`DirectionSource`], for reporting which path succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSourceKind {
    DwScheme,
    Header,
    Internal,
    File,
    None,
}

impl DirectionSource {
    pub fn kind(&self) -> DirectionSourceKind {
        match self {
            DirectionSource::DwScheme { .. } => DirectionSourceKind::DwScheme,
            DirectionSource::Header { .. } => DirectionSourceKind::Header,
            DirectionSource::Internal { .. } => DirectionSourceKind::Internal,
            DirectionSource::File { .. } => DirectionSourceKind::File,
            DirectionSource::None => DirectionSourceKind::None,
        }
    }

    /// Build the catalogue. `None` resolves to `Ok(None)`.
    pub fn resolve(&self) -> Result<Option<DirectionSet>> {
        match self {
            DirectionSource::DwScheme { scheme, shell } => {
                from_scheme(scheme, *shell).map(Some)
            }
            DirectionSource::Header { rows } => directions_from_rows(rows).map(Some),
            DirectionSource::Internal { count } => DirectionSet::half_sphere(*count).map(Some),
            DirectionSource::File { path } => {
                let rows = crate::io::load_direction_rows(path)?;
                directions_from_rows(&rows).map(Some)
            }
            DirectionSource::None => Ok(None),
        }
    }

    /// Try each candidate in order and return the first catalogue that builds.
    ///
    /// Failures and `None` sources are skipped.
    pub fn resolve_first(
        candidates: &[DirectionSource],
    ) -> Option<(DirectionSourceKind, DirectionSet)> {
        for candidate in candidates {
            match candidate.resolve() {
                Ok(Some(set)) => {
                    debug!(
                        "direction catalogue initialised from {:?} ({} directions)",
                        candidate.kind(),
                        set.len()
                    );
                    return Some((candidate.kind(), set));
                }
                Ok(None) => {}
                Err(err) => debug!("direction source {:?} unavailable: {err}", candidate.kind()),
            }
        }
        None
    }
}

fn from_scheme(scheme: &GradientScheme, shell: Option<usize>) -> Result<DirectionSet> {
    let shells = scheme.shells();
    let index = match shell {
        Some(i) => i,
        None => shells
            .len()
            .checked_sub(1)
            .ok_or_else(|| SegmentError::Directions("no valid DW scheme".to_string()))?,
    };
    let selected = shells.get(index).ok_or_else(|| {
        SegmentError::Directions(format!(
            "shell index {index} outside valid range (found {} shells)",
            shells.len()
        ))
    })?;
    if selected.is_bzero() {
        return Err(SegmentError::Directions(
            "b=0 shell has no directions".to_string(),
        ));
    }
    let dirs = selected
        .volumes
        .iter()
        .map(|&v| {
            let [x, y, z, _] = scheme.rows[v];
            Vector3::new(x, y, z)
        })
        .collect();
    DirectionSet::new(dirs)
}

/// Interpret rows of either `[azimuth, elevation]` or `[x, y, z]`.
pub fn directions_from_rows(rows: &[Vec<f32>]) -> Result<DirectionSet> {
    let cols = rows
        .first()
        .map(Vec::len)
        .ok_or_else(|| SegmentError::Directions("no direction rows".to_string()))?;
    if cols != 2 && cols != 3 {
        return Err(SegmentError::Directions(format!(
            "direction rows should have 2 or 3 columns, found {cols}"
        )));
    }
    if let Some(row) = rows.iter().position(|r| r.len() != cols) {
        return Err(SegmentError::Directions(format!(
            "variable number of columns (row {row})"
        )));
    }
    if cols == 2 {
        let pairs: Vec<[f32; 2]> = rows.iter().map(|r| [r[0], r[1]]).collect();
        DirectionSet::from_azimuth_elevation(&pairs)
    } else {
        DirectionSet::new(rows.iter().map(|r| Vector3::new(r[0], r[1], r[2])).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_shell_scheme() -> GradientScheme {
        let mut rows = vec![[0.0, 0.0, 0.0, 0.0]];
        let set = DirectionSet::half_sphere(30).unwrap();
        for (i, d) in set.dirs().iter().enumerate() {
            let b = if i % 2 == 0 { 1000.0 } else { 3000.0 };
            rows.push([d.x, d.y, d.z, b]);
        }
        GradientScheme::new(rows)
    }

    #[test]
    fn dw_scheme_defaults_to_highest_shell() {
        let source = DirectionSource::DwScheme {
            scheme: two_shell_scheme(),
            shell: None,
        };
        let set = source.resolve().unwrap().unwrap();
        assert_eq!(set.len(), 15);
    }

    #[test]
    fn dw_scheme_rejects_bzero_and_out_of_range_shell() {
        for shell in [0, 7] {
            let source = DirectionSource::DwScheme {
                scheme: two_shell_scheme(),
                shell: Some(shell),
            };
            assert!(matches!(source.resolve(), Err(SegmentError::Directions(_))));
        }
    }

    #[test]
    fn header_rows_need_consistent_columns() {
        let bad = DirectionSource::Header {
            rows: vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0]],
        };
        assert!(bad.resolve().is_err());
        let wide = DirectionSource::Header {
            rows: vec![vec![1.0, 0.0, 0.0, 1.0]],
        };
        assert!(wide.resolve().is_err());
    }

    #[test]
    fn resolve_first_falls_back_in_order() {
        let candidates = [
            DirectionSource::DwScheme {
                scheme: GradientScheme::default(),
                shell: None,
            },
            DirectionSource::Header { rows: Vec::new() },
            DirectionSource::Internal { count: 60 },
        ];
        let (kind, set) = DirectionSource::resolve_first(&candidates).unwrap();
        assert_eq!(kind, DirectionSourceKind::Internal);
        assert_eq!(set.len(), 60);
        assert!(DirectionSource::resolve_first(&[DirectionSource::None]).is_none());
    }

    #[test]
    fn source_parses_from_tagged_json() {
        let json = r#"{"type":"internal","count":45}"#;
        let source: DirectionSource = serde_json::from_str(json).unwrap();
        assert_eq!(source, DirectionSource::Internal { count: 45 });
    }
}
