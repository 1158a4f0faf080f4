//! File helpers for the command-line tool.
//!
//! - `write_json_file`: pretty-print a serializable value to disk.
//! - `read_json_file`: parse a JSON document into any deserializable type.
//! - `load_direction_rows`: read a plain-text table of direction rows.
use crate::error::{Result, SegmentError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| SegmentError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SegmentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| SegmentError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read numeric rows separated by whitespace or commas. Blank lines and
/// lines starting with `#` are skipped.
pub fn load_direction_rows(path: &Path) -> Result<Vec<Vec<f32>>> {
    let contents = read_to_string(path)?;
    parse_rows(&contents).map_err(|message| {
        SegmentError::Directions(format!("{}: {message}", path.display()))
    })
}

fn parse_rows(contents: &str) -> std::result::Result<Vec<Vec<f32>>, String> {
    let mut rows = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<f32>()
                    .map_err(|e| format!("line {}: invalid value '{tok}': {e}", line_no + 1))
            })
            .collect::<std::result::Result<Vec<f32>, String>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| SegmentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SegmentError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_accept_mixed_separators_and_comments() {
        let rows = parse_rows("# az el\n0.0, 1.5\n\n  3.1 0.2 \n").unwrap();
        assert_eq!(rows, vec![vec![0.0, 1.5], vec![3.1, 0.2]]);
    }

    #[test]
    fn bad_token_reports_line() {
        let err = parse_rows("1 2 3\n1 x 3\n").unwrap_err();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn json_round_trip_through_disk() {
        let dir = std::env::temp_dir().join(format!("fod_lobes_io_{}", std::process::id()));
        let path = dir.join("nested").join("value.json");
        write_json_file(&path, &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = read_json_file(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_direction_rows(Path::new("/nonexistent/dirs.txt")).unwrap_err();
        assert!(matches!(err, SegmentError::Io { .. }));
    }
}
