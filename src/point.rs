//! Point storage shared by fitting and prediction.
//!
//! Points live in a row-major `Array2<f64>`: one row per point, one column per
//! dimension. Cluster labels are not stored here; the engine that fits or
//! predicts owns them as a parallel `Array1<usize>`.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

/// A fixed-dimensionality collection of points.
///
/// A set may hold zero points as long as its dimensionality is known, as
/// with a dataset file declaring `0` rows. Fitting such a set fails with
/// `DegenerateClustering`; predicting on it yields no labels.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    data: Array2<f64>,
}

impl PointSet {
    /// Wraps a `(num_points, num_dims)` matrix.
    pub fn new(data: Array2<f64>) -> Result<Self> {
        if data.len_of(Axis(1)) == 0 {
            return Err(Error::invalid("num_dims", "points need at least one dimension"));
        }
        Ok(PointSet { data })
    }

    /// Builds a point set from row vectors, failing on the first ragged row.
    ///
    /// Empty `rows` is `InvalidArgument`: there is no row to take the
    /// dimensionality from. Use [`PointSet::new`] with a `(0, d)` matrix instead.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let num_dims = match rows.first() {
            Some(first) => first.len(),
            None => return Err(Error::invalid("rows", "empty input")),
        };
        let mut flat = Vec::with_capacity(rows.len() * num_dims);
        for row in rows {
            if row.len() != num_dims {
                return Err(Error::DimensionMismatch {
                    expected: num_dims,
                    found: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), num_dims), flat)
            .map_err(|e| Error::invalid("rows", e.to_string()))?;
        Self::new(data)
    }

    pub fn num_points(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_dims(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Coordinates of point `i`. Panics if `i` is out of range.
    pub fn point(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }
}

/// A persisted clustering: the centroid matrix and nothing else.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    centroids: Array2<f64>,
}

impl Model {
    /// Wraps a `(num_clusters, num_dims)` centroid matrix.
    pub fn new(centroids: Array2<f64>) -> Result<Self> {
        if centroids.len_of(Axis(0)) == 0 {
            return Err(Error::invalid("num_clusters", "a model needs at least one centroid"));
        }
        if centroids.len_of(Axis(1)) == 0 {
            return Err(Error::invalid("num_dims", "centroids need at least one dimension"));
        }
        Ok(Model { centroids })
    }

    pub fn num_clusters(&self) -> usize {
        self.centroids.len_of(Axis(0))
    }

    pub fn num_dims(&self) -> usize {
        self.centroids.len_of(Axis(1))
    }

    pub fn centroids(&self) -> ArrayView2<'_, f64> {
        self.centroids.view()
    }
}
