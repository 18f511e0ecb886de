//! Elbow search: pick k from the inertia curve over a range of candidates.
//!
//! Every candidate is fitted independently with the fixed budget
//! ([`DEFAULT_MAX_ITERATIONS`], [`DEFAULT_THRESHOLD`]). The chosen k is the
//! sample farthest from the chord joining the first and last `(k, inertia)`
//! samples; the first maximum in ascending k wins.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::kmeans::{ClusterEngine, DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD};
use crate::point::PointSet;

/// Inertia per candidate and the selected k.
#[derive(Clone, Debug, PartialEq)]
pub struct ElbowReport {
    /// `(k, inertia)` in ascending k.
    pub samples: Vec<(usize, f64)>,
    pub best_k: usize,
}

/// Runs k-means for every k in `min_k..=max_k` and selects the elbow.
#[derive(Clone, Debug)]
pub struct ElbowSelector {
    min_k: usize,
    max_k: usize,
    seed: u64,
}

impl ElbowSelector {
    /// Fails with `InvalidArgument` unless `1 <= min_k <= max_k`.
    pub fn new(min_k: usize, max_k: usize) -> Result<Self> {
        if min_k < 1 {
            return Err(Error::invalid("min_k", "must be at least 1"));
        }
        if max_k < min_k {
            return Err(Error::invalid(
                "max_k",
                format!("must be at least min_k ({min_k}), got {max_k}"),
            ));
        }
        Ok(ElbowSelector {
            min_k,
            max_k,
            seed: 0,
        })
    }

    /// Base seed; candidate k is fitted with `StdRng::seed_from_u64(seed + k)`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fails with `DegenerateClustering` before fitting anything when
    /// `max_k` exceeds the number of points.
    pub fn search(&self, points: &PointSet) -> Result<ElbowReport> {
        if self.max_k > points.num_points() {
            return Err(Error::DegenerateClustering {
                requested: self.max_k,
                n_points: points.num_points(),
            });
        }

        let samples = (self.min_k..=self.max_k)
            .into_par_iter()
            .map(|k| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(k as u64));
                let mut engine = ClusterEngine::new(k, points)?;
                let report = engine.fit(DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD, &mut rng)?;
                let inertia = engine.inertia();
                info!(k, inertia, iterations = report.iterations, "elbow candidate");
                Ok((k, inertia))
            })
            .collect::<Result<Vec<_>>>()?;

        let best_k = select_elbow(&samples);
        info!(best_k, "elbow search finished");
        Ok(ElbowReport { samples, best_k })
    }
}

/// Convenience wrapper returning only the selected k.
pub fn elbow_method(points: &PointSet, min_k: usize, max_k: usize, seed: u64) -> Result<usize> {
    let report = ElbowSelector::new(min_k, max_k)?
        .with_seed(seed)
        .search(points)?;
    Ok(report.best_k)
}

/// Picks the sample with the largest perpendicular distance to the chord
/// through the first and last samples. `samples` must be non-empty and in
/// ascending k.
fn select_elbow(samples: &[(usize, f64)]) -> usize {
    let (first_k, first_y) = samples[0];
    let (last_k, last_y) = samples[samples.len() - 1];
    if first_k == last_k {
        return first_k;
    }

    // y = m*x + b through both endpoints.
    let m = (last_y - first_y) / (last_k - first_k) as f64;
    let b = first_y - m * first_k as f64;
    let norm = (m * m + 1.0).sqrt();

    let mut best_k = first_k;
    let mut best_distance = f64::NEG_INFINITY;
    for &(k, y) in samples {
        let distance = (m * k as f64 + b - y).abs() / norm;
        if distance > best_distance {
            best_distance = distance;
            best_k = k;
        }
    }
    best_k
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blobs() -> PointSet {
        let mut rows = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)] {
            for i in 0..10 {
                let dx = (i % 3) as f64 * 0.1;
                let dy = (i / 3) as f64 * 0.1;
                rows.push(vec![cx + dx, cy + dy]);
            }
        }
        PointSet::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_select_elbow_knee() {
        let samples = vec![(1, 100.0), (2, 40.0), (3, 10.0), (4, 8.0), (5, 7.0), (6, 6.0)];
        assert_eq!(select_elbow(&samples), 3);
    }

    #[test]
    fn test_select_elbow_straight_line_takes_first() {
        let samples = vec![(2, 30.0), (3, 20.0), (4, 10.0)];
        assert_eq!(select_elbow(&samples), 2);
    }

    #[test]
    fn test_select_elbow_single_sample() {
        assert_eq!(select_elbow(&[(4, 12.5)]), 4);
    }

    #[test]
    fn test_select_elbow_tie_takes_lowest_k() {
        // Symmetric dips at k=2 and k=4 are equally far from the flat chord.
        let samples = vec![(1, 10.0), (2, 5.0), (3, 10.0), (4, 5.0), (5, 10.0)];
        assert_eq!(select_elbow(&samples), 2);
    }

    #[test]
    fn test_invalid_range() {
        assert!(matches!(
            ElbowSelector::new(0, 3),
            Err(Error::InvalidArgument { name: "min_k", .. })
        ));
        assert!(matches!(
            ElbowSelector::new(4, 3),
            Err(Error::InvalidArgument { name: "max_k", .. })
        ));
    }

    #[test]
    fn test_equal_bounds_returns_min_k() {
        let points = three_blobs();
        assert_eq!(elbow_method(&points, 3, 3, 9).unwrap(), 3);
    }

    #[test]
    fn test_search_samples_cover_range() {
        let points = three_blobs();
        let report = ElbowSelector::new(1, 8).unwrap().with_seed(42).search(&points).unwrap();
        assert_eq!(report.samples.len(), 8);
        assert!(report.samples.windows(2).all(|w| w[0].0 + 1 == w[1].0));
        assert!(report.samples.iter().all(|&(_, inertia)| inertia >= 0.0));
        assert!(report.samples[0].1 > report.samples[7].1);
        assert!((1..=8).contains(&report.best_k));
    }

    #[test]
    fn test_search_is_deterministic() {
        let points = three_blobs();
        let selector = ElbowSelector::new(1, 6).unwrap().with_seed(5);
        assert_eq!(selector.search(&points).unwrap(), selector.search(&points).unwrap());
    }

    #[test]
    fn test_candidate_above_point_count() {
        let points = PointSet::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
        assert!(matches!(
            elbow_method(&points, 1, 3, 0),
            Err(Error::DegenerateClustering { requested: 3, .. })
        ));
    }

    #[test]
    fn test_huge_max_k_fails_before_fitting() {
        let points = three_blobs();
        assert!(matches!(
            elbow_method(&points, 1, usize::MAX / 2, 0),
            Err(Error::DegenerateClustering { n_points: 30, .. })
        ));
    }
}
