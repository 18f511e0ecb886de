//! Plain-text dataset, model and prediction files.
//!
//! Datasets and models share one layout:
//!
//! ```text
//! <rows>
//! <dims>
//! <dims whitespace-separated values>   (one line per row)
//! ```
//!
//! Predictions are one label per line. Every writer goes through a sibling
//! `.tmp` file that is renamed into place, so a failed write never leaves a
//! half-written destination.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::point::{Model, PointSet};

/// Reads a dataset file.
pub fn load_points(path: &Path) -> Result<PointSet> {
    let data = read_matrix(path)?;
    debug!(path = %path.display(), rows = data.nrows(), dims = data.ncols(), "loaded dataset");
    PointSet::new(data)
}

/// Writes a dataset file.
pub fn save_points(path: &Path, points: &PointSet) -> Result<()> {
    write_atomic(path, &format_matrix(points.view()))
}

/// Reads a model file (centroids only).
pub fn load_model(path: &Path) -> Result<Model> {
    let centroids = read_matrix(path)?;
    debug!(path = %path.display(), k = centroids.nrows(), dims = centroids.ncols(), "loaded model");
    Model::new(centroids).map_err(|e| Error::MalformedData {
        path: path.to_path_buf(),
        line: 1,
        message: e.to_string(),
    })
}

/// Writes a model file.
pub fn save_model(path: &Path, model: &Model) -> Result<()> {
    write_atomic(path, &format_matrix(model.centroids()))
}

/// Writes one label per line, in point order.
pub fn save_predictions(path: &Path, labels: ArrayView1<'_, usize>) -> Result<()> {
    let mut out = String::with_capacity(labels.len() * 2);
    for label in labels.iter() {
        let _ = writeln!(out, "{label}");
    }
    write_atomic(path, &out)
}

/// Reads a predictions file back into labels.
pub fn load_predictions(path: &Path) -> Result<Vec<usize>> {
    let text = read_to_string(path)?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.trim().parse::<usize>().map_err(|e| Error::MalformedData {
                path: path.to_path_buf(),
                line: i + 1,
                message: format!("invalid label {:?}: {e}", line.trim()),
            })
        })
        .collect()
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_matrix(path: &Path) -> Result<Array2<f64>> {
    let text = read_to_string(path)?;
    parse_matrix(path, &text)
}

/// Parses the two-line header plus exactly `rows` lines of `dims` values.
fn parse_matrix(path: &Path, text: &str) -> Result<Array2<f64>> {
    let malformed = |line: usize, message: String| Error::MalformedData {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut header = |what: &str| -> Result<usize> {
        let (n, line) = lines
            .next()
            .ok_or_else(|| malformed(0, format!("missing {what} header")))?;
        line.trim()
            .parse::<usize>()
            .map_err(|e| malformed(n, format!("invalid {what} {:?}: {e}", line.trim())))
    };
    let rows = header("row count")?;
    let dims = header("dimension count")?;
    if dims == 0 {
        return Err(malformed(2, "dimension count must be at least 1".to_string()));
    }

    let total = rows
        .checked_mul(dims)
        .ok_or_else(|| malformed(1, format!("{rows} rows of {dims} values overflow")))?;
    // The header is untrusted; never reserve more than the text could hold.
    let mut values = Vec::with_capacity(total.min(text.len() / 2 + 1));
    let mut seen = 0;
    for (n, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        if seen == rows {
            return Err(malformed(n, format!("more than the declared {rows} rows")));
        }
        let before = values.len();
        for token in line.split_whitespace() {
            let value = token
                .parse::<f64>()
                .map_err(|e| malformed(n, format!("invalid value {token:?}: {e}")))?;
            values.push(value);
        }
        let found = values.len() - before;
        if found != dims {
            return Err(malformed(n, format!("expected {dims} values, found {found}")));
        }
        seen += 1;
    }
    if seen != rows {
        return Err(malformed(0, format!("declared {rows} rows, found {seen}")));
    }

    Array2::from_shape_vec((rows, dims), values).map_err(|e| malformed(0, e.to_string()))
}

fn format_matrix(data: ArrayView2<'_, f64>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", data.nrows());
    let _ = writeln!(out, "{}", data.ncols());
    for row in data.outer_iter() {
        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{line}");
    }
    out
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `contents` to a sibling temp file, syncs it, then renames it over `path`.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp = temp_path(path);
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written {
        error!(path = %path.display(), "write failed: {}", e);
        let _ = fs::remove_file(&temp);
        return Err(io_err(e));
    }

    fs::rename(&temp, path).map_err(|e| {
        error!(path = %path.display(), "rename failed: {}", e);
        let _ = fs::remove_file(&temp);
        io_err(e)
    })
}
