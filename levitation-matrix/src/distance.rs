//! Pairwise distances between transducer cells, reflector cells and field points.
//!
//! All matrices are stored source-major: entry `(i, j)` is the distance from source
//! cell `i` to target `j`. Field points are enumerated x-major, so target
//! `q = j·Z + k` is the point `(x[j], z[k])`.

use crate::error::Result;
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// The three distance matrices of the levitator.
#[derive(Debug, Clone)]
pub struct DistanceFields {
    /// r_nm: transducer cells × field points (N × M)
    pub transducer_field: Array2<f64>,
    /// r_im: reflector cells × field points (L × M)
    pub reflector_field: Array2<f64>,
    /// r_in: transducer cells × reflector cells (N × L)
    pub transducer_reflector: Array2<f64>,
}

impl DistanceFields {
    pub fn new(grid: &Grid, parallel: bool) -> Result<Self> {
        let n = grid.n_transducer();
        let l = grid.n_x();
        let m = grid.n_field();

        let transducer_field = fill_matrix(n, m, parallel, |i, q| {
            let (x, z) = grid.field_point(q);
            planar_distance(grid.transducer[i], grid.z_transducer, x, z)
        })?;

        let reflector_field = fill_matrix(l, m, parallel, |i, q| {
            let (x, z) = grid.field_point(q);
            planar_distance(grid.x[i], grid.z_reflector, x, z)
        })?;

        let transducer_reflector = fill_matrix(n, l, parallel, |i, j| {
            planar_distance(grid.transducer[i], grid.z_transducer, grid.x[j], grid.z_reflector)
        })?;

        tracing::debug!(
            "distance matrices: r_nm {:?}, r_im {:?}, r_in {:?}",
            transducer_field.dim(),
            reflector_field.dim(),
            transducer_reflector.dim()
        );

        Ok(Self {
            transducer_field,
            reflector_field,
            transducer_reflector,
        })
    }

    /// r_ni: reflector cells × transducer cells (L × N).
    ///
    /// A transposed view of r_in, so every entry is the same `f64`.
    pub fn reflector_transducer(&self) -> ArrayView2<'_, f64> {
        self.transducer_reflector.t()
    }
}

/// Euclidean distance in the (x, z) plane.
#[inline]
pub fn planar_distance(x0: f64, z0: f64, x1: f64, z1: f64) -> f64 {
    let dx = x0 - x1;
    let dz = z0 - z1;
    (dx * dx + dz * dz).sqrt()
}

/// Builds a `rows × cols` matrix from `f(row, col)`.
///
/// With `parallel` set, entries are computed on the rayon pool. Each entry is
/// produced by exactly one call to `f`, so both paths give identical results.
pub(crate) fn fill_matrix<T, F>(
    rows: usize,
    cols: usize,
    parallel: bool,
    f: F,
) -> Result<Array2<T>>
where
    T: Send,
    F: Fn(usize, usize) -> T + Sync,
{
    if !parallel || rows == 0 || cols == 0 {
        return Ok(Array2::from_shape_fn((rows, cols), |(i, j)| f(i, j)));
    }

    let values: Vec<T> = (0..rows * cols)
        .into_par_iter()
        .map(|idx| f(idx / cols, idx % cols))
        .collect();

    Ok(Array2::from_shape_vec((rows, cols), values)?)
}
