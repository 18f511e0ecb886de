//! k-means clustering with elbow-based selection of k.
//!
//! - [`kmeans`]: Lloyd iterations over a borrowed [`PointSet`] (seeded random
//!   initialization, nearest-centroid assignment, mean update, displacement
//!   based convergence).
//! - [`elbow`]: fits a range of k and picks the knee of the inertia curve.
//! - [`io`], [`blob`], [`cli`]: plain-text files, synthetic data and the
//!   command surface of the `kmeans` binary.
//!
//! ```rust
//! use kcluster::{ClusterEngine, PointSet};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let points = PointSet::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![10.0, 10.0],
//!     vec![10.0, 11.0],
//! ])
//! .unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut engine = ClusterEngine::new(2, &points).unwrap();
//! engine.fit(100, 1e-6, &mut rng).unwrap();
//! let labels = engine.labels();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

#![forbid(unsafe_code)]

pub mod blob;
pub mod cli;
pub mod elbow;
pub mod error;
pub mod io;
pub mod kmeans;
pub mod point;

pub use blob::{generate_blobs, BlobConfig, Blobs, Spread};
pub use elbow::{elbow_method, ElbowReport, ElbowSelector};
pub use error::{Error, Result};
pub use kmeans::{ClusterEngine, FitReport, StopReason, DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD};
pub use point::{Model, PointSet};
