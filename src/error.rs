//! Error type shared by the engine, the elbow search and file I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the clustering engine and its file collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value is out of range or unparsable.
    #[error("invalid argument {name}: {message}")]
    InvalidArgument {
        /// Argument or parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// A file could not be opened, read, written or renamed.
    #[error("i/o failure on {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// File content does not match its declared header.
    #[error("malformed data in {} at line {line}: {message}", .path.display())]
    MalformedData {
        /// File being parsed.
        path: PathBuf,
        /// 1-based line number, 0 when the problem is the file as a whole.
        line: usize,
        /// Human-readable explanation.
        message: String,
    },

    /// Points, centroids or models disagree on dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// The requested clustering cannot be formed from the available points.
    #[error("degenerate clustering: requested {requested} clusters, but dataset has {n_points} points")]
    DegenerateClustering {
        /// Requested number of clusters.
        requested: usize,
        /// Number of points in the dataset.
        n_points: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
