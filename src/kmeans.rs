//! Lloyd's k-means: random seeding, nearest-centroid assignment, mean update.
//!
//! The engine borrows its points and owns everything it writes: the centroid
//! matrix and one label per point. Fitting stops once every centroid moved
//! less than `threshold` (squared distance) in one round, or after
//! `max_iterations` rounds.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::io;
use crate::point::{Model, PointSet};

/// Iteration budget used by the elbow search.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Convergence threshold used by the elbow search.
pub const DEFAULT_THRESHOLD: f64 = 1e-6;

/// Why a fit stopped. Neither is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The largest centroid displacement fell below the threshold.
    Converged,
    /// The iteration budget ran out first.
    MaxIterations,
}

/// Summary of a completed [`ClusterEngine::fit`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitReport {
    /// Assign/update rounds executed.
    pub iterations: usize,
    pub reason: StopReason,
    /// Largest squared centroid displacement of the last round (0 if none ran).
    pub max_displacement: f64,
}

/// k-means fitting and prediction over a borrowed point set.
pub struct ClusterEngine<'a> {
    num_clusters: usize,
    points: ArrayView2<'a, f64>,
    centroids: Array2<f64>,
    labels: Array1<usize>,
}

impl<'a> ClusterEngine<'a> {
    /// Fit mode: `num_clusters` centroid slots, zeroed until initialized.
    ///
    /// Fails before allocating when `num_clusters` is zero or exceeds the
    /// number of points.
    pub fn new(num_clusters: usize, points: &'a PointSet) -> Result<Self> {
        if num_clusters == 0 {
            return Err(Error::invalid("num_clusters", "must be at least 1"));
        }
        if num_clusters > points.num_points() {
            return Err(Error::DegenerateClustering {
                requested: num_clusters,
                n_points: points.num_points(),
            });
        }
        Ok(ClusterEngine {
            num_clusters,
            points: points.view(),
            centroids: Array2::zeros((num_clusters, points.num_dims())),
            labels: Array1::zeros(points.num_points()),
        })
    }

    /// Predict mode: centroids come from a persisted model.
    pub fn from_model(model: &Model, points: &'a PointSet) -> Result<Self> {
        if model.num_dims() != points.num_dims() {
            return Err(Error::DimensionMismatch {
                expected: model.num_dims(),
                found: points.num_dims(),
            });
        }
        Ok(ClusterEngine {
            num_clusters: model.num_clusters(),
            points: points.view(),
            centroids: model.centroids().to_owned(),
            labels: Array1::zeros(points.num_points()),
        })
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn num_dims(&self) -> usize {
        self.points.len_of(Axis(1))
    }

    pub fn num_points(&self) -> usize {
        self.points.len_of(Axis(0))
    }

    pub fn centroids(&self) -> ArrayView2<'_, f64> {
        self.centroids.view()
    }

    /// Labels from the most recent assignment.
    pub fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    /// Snapshot of the current centroids as a persistable model.
    pub fn to_model(&self) -> Result<Model> {
        Model::new(self.centroids.clone())
    }

    /// Copies `num_clusters` distinct, uniformly chosen points into the centroids.
    pub fn initialize_centroids<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        let n_points = self.num_points();
        if self.num_clusters > n_points {
            return Err(Error::DegenerateClustering {
                requested: self.num_clusters,
                n_points,
            });
        }

        // Reject-and-retry keeps the draw uniform over unseen indices.
        let mut selected = vec![false; n_points];
        for i in 0..self.num_clusters {
            let mut idx = rng.gen_range(0..n_points);
            while selected[idx] {
                idx = rng.gen_range(0..n_points);
            }
            selected[idx] = true;
            self.centroids.row_mut(i).assign(&self.points.row(idx));
        }
        Ok(())
    }

    /// Labels every point with its nearest centroid; ties go to the lower index.
    pub fn assign_points_to_centroids(&mut self) {
        let points = self.points;
        let centroids = &self.centroids;
        for (x, label) in points.outer_iter().zip(self.labels.iter_mut()) {
            let mut min_dist = f64::INFINITY;
            let mut min_j = 0;
            for (j, c) in centroids.outer_iter().enumerate() {
                let dist = squared_euclidean(&x, &c);
                if dist < min_dist {
                    min_dist = dist;
                    min_j = j;
                }
            }
            *label = min_j;
        }
    }

    /// Moves each centroid to the mean of its assigned points.
    ///
    /// A cluster with no points keeps its previous centroid. Returns how many
    /// clusters were empty.
    pub fn update_centroids(&mut self) -> usize {
        let mut sums = Array2::<f64>::zeros(self.centroids.raw_dim());
        let mut counts = vec![0usize; self.num_clusters];
        self.points
            .outer_iter()
            .zip(self.labels.iter())
            .for_each(|(x, &label)| {
                sums.row_mut(label).zip_mut_with(&x, |a, &b| *a += b);
                counts[label] += 1;
            });

        let mut empty = 0;
        for (i, (mut centroid, sum)) in self
            .centroids
            .outer_iter_mut()
            .zip(sums.outer_iter())
            .enumerate()
        {
            if counts[i] == 0 {
                debug!(cluster = i, "empty cluster keeps its previous centroid");
                empty += 1;
                continue;
            }
            let n = counts[i] as f64;
            centroid.zip_mut_with(&sum, |c, &s| *c = s / n);
        }
        empty
    }

    /// Runs seeding followed by assign/update rounds until convergence or
    /// until `max_iterations` rounds have run.
    ///
    /// Convergence is judged on centroid displacement, not on label stability:
    /// a point may still change cluster in the final round. With
    /// `max_iterations == 0` the points are only assigned to the seeds.
    pub fn fit<R: Rng>(
        &mut self,
        max_iterations: usize,
        threshold: f64,
        rng: &mut R,
    ) -> Result<FitReport> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::invalid(
                "threshold",
                format!("must be finite and non-negative, got {threshold}"),
            ));
        }

        self.initialize_centroids(rng)?;

        let mut report = FitReport {
            iterations: 0,
            reason: StopReason::MaxIterations,
            max_displacement: 0.0,
        };
        if max_iterations == 0 {
            self.assign_points_to_centroids();
            return Ok(report);
        }

        while report.iterations < max_iterations {
            self.assign_points_to_centroids();
            let previous = self.centroids.clone();
            let empty = self.update_centroids();

            let max_displacement = previous
                .outer_iter()
                .zip(self.centroids.outer_iter())
                .map(|(old, new)| squared_euclidean(&old, &new))
                .fold(0.0, f64::max);

            report.iterations += 1;
            report.max_displacement = max_displacement;
            debug!(
                iteration = report.iterations,
                max_displacement, empty, "k-means round"
            );

            if max_displacement < threshold {
                report.reason = StopReason::Converged;
                break;
            }
        }

        if report.reason == StopReason::MaxIterations {
            warn!(
                k = self.num_clusters,
                max_iterations,
                max_displacement = report.max_displacement,
                "k-means stopped before converging"
            );
        } else {
            info!(
                k = self.num_clusters,
                iterations = report.iterations,
                "k-means converged"
            );
        }
        Ok(report)
    }

    /// Sum of squared distances from each point to its nearest centroid.
    ///
    /// Re-assigns first, so the labels always match the current centroids.
    pub fn inertia(&mut self) -> f64 {
        self.assign_points_to_centroids();
        self.points
            .outer_iter()
            .zip(self.labels.iter())
            .map(|(x, &label)| squared_euclidean(&x, &self.centroids.row(label)))
            .sum()
    }

    /// Assigns every point and returns the labels.
    pub fn predict(&mut self) -> ArrayView1<'_, usize> {
        self.assign_points_to_centroids();
        self.labels.view()
    }

    /// Number of points per cluster under the current labels.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_clusters];
        self.labels.iter().for_each(|&label| {
            counts[label] += 1;
        });
        counts
    }

    pub fn save_model(&self, path: &Path) -> Result<()> {
        io::save_model(path, &self.to_model()?)
    }

    /// Assigns every point, then writes one label per line.
    pub fn save_predictions(&mut self, path: &Path) -> Result<()> {
        self.assign_points_to_centroids();
        io::save_predictions(path, self.labels.view())
    }
}

/// Squared Euclidean distance; no square root since only ordering matters.
pub(crate) fn squared_euclidean<S1, S2>(x: &ArrayBase<S1, Ix1>, y: &ArrayBase<S2, Ix1>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum()
}
