//! Transfer matrices: the discretized Rayleigh integral between cell sets.
//!
//! Each entry couples one radiating cell of area `s` to one target point at
//! distance `r` through the kernel
//! ```text
//! T = s · exp(-i·k·r) / r
//! ```
//! The matrices are filled source-major (one row per radiating cell) and then
//! turned into target-major form, so that `T · v` maps a vector over source cells
//! to a vector over targets.

use crate::distance::{fill_matrix, DistanceFields};
use crate::error::{ensure_shape, Result};
use crate::physics::CellAreas;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

/// Free-space kernel `area · exp(-i·k·r) / r`.
///
/// The singular self-pair `r = 0` contributes nothing and yields exactly zero.
#[inline]
pub fn green_kernel(area: f64, wavenumber: f64, r: f64) -> Complex64 {
    if r == 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    Complex64::from_polar(area, -wavenumber * r) / r
}

/// Kernel of a transducer cell: the full disk minus its unexcited central hole.
#[inline]
pub fn annular_kernel(areas: &CellAreas, wavenumber: f64, r: f64) -> Complex64 {
    green_kernel(areas.transducer, wavenumber, r) - green_kernel(areas.hole, wavenumber, r)
}

/// The four couplings of the levitator, each stored target × source.
#[derive(Debug, Clone)]
pub struct TransferMatrices {
    /// Transducer → field (M × N)
    pub transducer_field: Array2<Complex64>,
    /// Transducer → reflector (L × N)
    pub transducer_reflector: Array2<Complex64>,
    /// Reflector → transducer (N × L)
    pub reflector_transducer: Array2<Complex64>,
    /// Reflector → field (M × L)
    pub reflector_field: Array2<Complex64>,
}

impl TransferMatrices {
    pub fn assemble(
        distances: &DistanceFields,
        areas: &CellAreas,
        wavenumber: f64,
        parallel: bool,
    ) -> Result<Self> {
        let transducer_kernel = |r: f64| annular_kernel(areas, wavenumber, r);
        let reflector_kernel = |r: f64| green_kernel(areas.reflector, wavenumber, r);

        let transducer_field =
            map_distances(distances.transducer_field.view(), parallel, transducer_kernel)?;
        let transducer_reflector =
            map_distances(distances.transducer_reflector.view(), parallel, transducer_kernel)?;
        let reflector_transducer =
            map_distances(distances.reflector_transducer(), parallel, reflector_kernel)?;
        let reflector_field =
            map_distances(distances.reflector_field.view(), parallel, reflector_kernel)?;

        let matrices = Self {
            transducer_field: transducer_field.reversed_axes(),
            transducer_reflector: transducer_reflector.reversed_axes(),
            reflector_transducer: reflector_transducer.reversed_axes(),
            reflector_field: reflector_field.reversed_axes(),
        };

        let (n, m) = distances.transducer_field.dim();
        let l = distances.reflector_field.nrows();
        matrices.validate(n, l, m)?;
        Ok(matrices)
    }

    /// Checks every matrix against N transducer cells, L reflector cells and M field points.
    pub fn validate(&self, n: usize, l: usize, m: usize) -> Result<()> {
        ensure_shape("transducer -> field", &[m, n], self.transducer_field.shape())?;
        ensure_shape("transducer -> reflector", &[l, n], self.transducer_reflector.shape())?;
        ensure_shape("reflector -> transducer", &[n, l], self.reflector_transducer.shape())?;
        ensure_shape("reflector -> field", &[m, l], self.reflector_field.shape())?;
        Ok(())
    }

    /// (N, L, M)
    pub fn dims(&self) -> (usize, usize, usize) {
        let (m, n) = self.transducer_field.dim();
        (n, self.reflector_field.ncols(), m)
    }
}

fn map_distances<F>(
    distances: ArrayView2<'_, f64>,
    parallel: bool,
    kernel: F,
) -> Result<Array2<Complex64>>
where
    F: Fn(f64) -> Complex64 + Sync,
{
    let (rows, cols) = distances.dim();
    fill_matrix(rows, cols, parallel, |i, j| kernel(distances[[i, j]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, MM};
    use crate::grid::Grid;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const K: f64 = 2.0 * PI * 56_000.0 / 340.1;

    fn small_setup() -> (Grid, DistanceFields, CellAreas) {
        let config = GridConfig {
            x_min: -6.0 * MM,
            x_max: 6.0 * MM,
            z_min: 0.0,
            z_max: 5.0 * MM,
            step: 1.0 * MM,
            cells: 100.0,
        };
        let grid = Grid::new(&config, 3.0 * MM).unwrap();
        let distances = DistanceFields::new(&grid, false).unwrap();
        let areas = CellAreas::new(3.0 * MM, 0.5 * MM, 6.0 * MM, 100.0, 4.0);
        (grid, distances, areas)
    }

    #[test]
    fn test_green_kernel_magnitude_and_phase() {
        let r = 0.01;
        let g = green_kernel(2.0, K, r);
        assert_relative_eq!(g.norm(), 2.0 / r, max_relative = 1e-12);
        let expected = Complex64::new(0.0, -K * r).exp() * 2.0 / r;
        assert_relative_eq!((g - expected).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_distance_gives_zero() {
        let g = green_kernel(1.0, K, 0.0);
        assert_eq!(g, Complex64::new(0.0, 0.0));
        assert!(annular_kernel(&CellAreas::new(1.0, 0.5, 1.0, 1.0, 1.0), K, 0.0).is_finite());
    }

    #[test]
    fn test_shapes_follow_target_major_convention() {
        let (grid, distances, areas) = small_setup();
        let t = TransferMatrices::assemble(&distances, &areas, K, false).unwrap();
        let (n, l, m) = (grid.n_transducer(), grid.n_x(), grid.n_field());
        assert_eq!(t.transducer_field.dim(), (m, n));
        assert_eq!(t.transducer_reflector.dim(), (l, n));
        assert_eq!(t.reflector_transducer.dim(), (n, l));
        assert_eq!(t.reflector_field.dim(), (m, l));
        assert_eq!(t.dims(), (n, l, m));
    }

    #[test]
    fn test_reflector_field_self_pairs_are_exactly_zero() {
        let (grid, distances, areas) = small_setup();
        let t = TransferMatrices::assemble(&distances, &areas, K, true).unwrap();
        let nz = grid.n_z();
        for i in 0..grid.n_x() {
            assert_eq!(t.reflector_field[[i * nz, i]], Complex64::new(0.0, 0.0));
        }
        assert!(t.reflector_field.iter().all(|v| v.is_finite()));
        assert!(t.transducer_field.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_entries_follow_kernel() {
        let (grid, distances, areas) = small_setup();
        let t = TransferMatrices::assemble(&distances, &areas, K, false).unwrap();
        let nz = grid.n_z();
        let q = 4 * nz + 3;

        let r = distances.transducer_field[[2, q]];
        let expected = green_kernel(areas.transducer, K, r) - green_kernel(areas.hole, K, r);
        assert_eq!(t.transducer_field[[q, 2]], expected);
        // Hole correction shrinks the effective area to s_n - s_h
        let effective = Complex64::from_polar(areas.transducer - areas.hole, -K * r) / r;
        assert_relative_eq!((expected - effective).norm(), 0.0, epsilon = 1e-12 * effective.norm());

        let r = distances.transducer_reflector[[1, 5]];
        assert_eq!(t.reflector_transducer[[1, 5]], green_kernel(areas.reflector, K, r));
        assert_eq!(t.transducer_reflector[[5, 1]], annular_kernel(&areas, K, r));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (_, distances, areas) = small_setup();
        let serial = TransferMatrices::assemble(&distances, &areas, K, false).unwrap();
        let parallel = TransferMatrices::assemble(&distances, &areas, K, true).unwrap();
        assert_eq!(serial.transducer_field, parallel.transducer_field);
        assert_eq!(serial.transducer_reflector, parallel.transducer_reflector);
        assert_eq!(serial.reflector_transducer, parallel.reflector_transducer);
        assert_eq!(serial.reflector_field, parallel.reflector_field);
    }

    #[test]
    fn test_validate_rejects_mismatch() {
        let (grid, distances, areas) = small_setup();
        let t = TransferMatrices::assemble(&distances, &areas, K, false).unwrap();
        let (n, l, m) = (grid.n_transducer(), grid.n_x(), grid.n_field());
        assert!(t.validate(n, l, m).is_ok());
        assert!(t.validate(n + 1, l, m).unwrap_err().is_shape_mismatch());
        assert!(t.validate(n, l, m - 1).unwrap_err().is_shape_mismatch());
    }
}
