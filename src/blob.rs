//! Synthetic blob datasets for exercising the engine.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::Normal;

use crate::error::{Error, Result};
use crate::point::PointSet;

/// How points scatter around their center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Spread {
    /// Each coordinate offset is `(u - 0.5) * radius`, `u` uniform in [0, 1).
    #[default]
    Uniform,
    /// Each coordinate offset is drawn from `Normal(0, radius)`.
    Gaussian,
}

#[derive(Clone, Debug)]
pub struct BlobConfig {
    pub num_points: usize,
    pub num_dims: usize,
    pub num_clusters: usize,
    pub radius: f64,
    pub spread: Spread,
}

/// Generated points plus the ground truth they were drawn from.
#[derive(Clone, Debug)]
pub struct Blobs {
    pub points: PointSet,
    /// `(num_clusters, num_dims)`, each coordinate uniform in [0, 1).
    pub centers: Array2<f64>,
    /// Index of the center each point was drawn around.
    pub memberships: Array1<usize>,
}

/// Places `num_clusters` random centers and scatters points around them.
pub fn generate_blobs<R: Rng>(config: &BlobConfig, rng: &mut R) -> Result<Blobs> {
    if config.num_clusters == 0 {
        return Err(Error::invalid("num_clusters", "must be at least 1"));
    }
    if config.num_dims == 0 {
        return Err(Error::invalid("num_dims", "must be at least 1"));
    }
    if !config.radius.is_finite() || config.radius < 0.0 {
        return Err(Error::invalid(
            "radius",
            format!("must be finite and non-negative, got {}", config.radius),
        ));
    }

    let shape = (config.num_points, config.num_dims);
    let centers = Array2::random_using(
        (config.num_clusters, config.num_dims),
        Uniform::new(0.0, 1.0),
        rng,
    );
    let memberships = Array1::random_using(
        config.num_points,
        Uniform::new(0, config.num_clusters),
        rng,
    );
    let offsets = match config.spread {
        Spread::Uniform => Array2::random_using(shape, Uniform::new(0.0, 1.0), rng)
            .mapv(|u: f64| (u - 0.5) * config.radius),
        Spread::Gaussian => {
            let normal = Normal::new(0.0, config.radius)
                .map_err(|e| Error::invalid("radius", e.to_string()))?;
            Array2::random_using(shape, normal, rng)
        }
    };

    let mut data = offsets;
    for (mut row, &center) in data.axis_iter_mut(Axis(0)).zip(memberships.iter()) {
        row += &centers.row(center);
    }

    Ok(Blobs {
        points: PointSet::new(data)?,
        centers,
        memberships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(radius: f64, spread: Spread) -> BlobConfig {
        BlobConfig {
            num_points: 200,
            num_dims: 3,
            num_clusters: 4,
            radius,
            spread,
        }
    }

    #[test]
    fn test_uniform_points_stay_within_radius() {
        let mut rng = StdRng::seed_from_u64(42);
        let blobs = generate_blobs(&config(0.2, Spread::Uniform), &mut rng).unwrap();
        assert_eq!(blobs.points.num_points(), 200);
        assert_eq!(blobs.points.num_dims(), 3);
        assert!(blobs.centers.iter().all(|&c| (0.0..1.0).contains(&c)));

        for (i, &m) in blobs.memberships.iter().enumerate() {
            assert!(m < 4);
            let point = blobs.points.point(i);
            for (p, c) in point.iter().zip(blobs.centers.row(m).iter()) {
                assert!((p - c).abs() <= 0.1 + 1e-12);
            }
        }
    }

    #[test]
    fn test_gaussian_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        let blobs = generate_blobs(&config(0.05, Spread::Gaussian), &mut rng).unwrap();
        assert_eq!(blobs.points.num_points(), 200);
        assert!(blobs.points.view().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_zero_radius_collapses_to_centers() {
        let mut rng = StdRng::seed_from_u64(1);
        let blobs = generate_blobs(&config(0.0, Spread::Uniform), &mut rng).unwrap();
        for (i, &m) in blobs.memberships.iter().enumerate() {
            assert_eq!(blobs.points.point(i), blobs.centers.row(m));
        }
    }

    #[test]
    fn test_seeded_generation_repeats() {
        let a = generate_blobs(&config(0.3, Spread::Uniform), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_blobs(&config(0.3, Spread::Uniform), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.points, b.points);
        assert_eq!(a.memberships, b.memberships);
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut bad = config(0.1, Spread::Uniform);
        bad.num_clusters = 0;
        assert!(generate_blobs(&bad, &mut rng).is_err());

        let mut bad = config(-1.0, Spread::Gaussian);
        assert!(generate_blobs(&bad, &mut rng).is_err());
        bad.radius = f64::NAN;
        assert!(generate_blobs(&bad, &mut rng).is_err());
    }
}
