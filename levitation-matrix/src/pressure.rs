use crate::error::{ensure_shape, Result};
use crate::grid::linspace;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Complex pressure on the field grid, rows indexing z and columns indexing x.
#[derive(Debug, Clone)]
pub struct PressureField {
    pub x: Array1<f64>,
    pub z: Array1<f64>,
    pub values: Array2<Complex64>, // Z × L
}

impl PressureField {
    /// Reshapes an x-major pressure vector of length L·Z into the Z × L layout.
    pub fn from_vector(
        pressure: &Array1<Complex64>,
        x: &Array1<f64>,
        z: &Array1<f64>,
    ) -> Result<Self> {
        let (nx, nz) = (x.len(), z.len());
        ensure_shape("pressure reshape", &[nx * nz], pressure.shape())?;

        let by_x = pressure.to_owned().into_shape_with_order((nx, nz))?;
        let values = by_x.reversed_axes().as_standard_layout().into_owned();

        Ok(Self {
            x: x.clone(),
            z: z.clone(),
            values,
        })
    }

    pub fn real(&self) -> Array2<f64> {
        self.values.mapv(|p| p.re)
    }

    pub fn magnitude(&self) -> Array2<f64> {
        self.values.mapv(|p| p.norm())
    }

    pub fn min_real(&self) -> f64 {
        self.values.iter().map(|p| p.re).fold(f64::INFINITY, f64::min)
    }

    /// Symmetric colour range `(min/2, -min/2)` over the real part.
    pub fn color_limits(&self) -> (f64, f64) {
        let min = self.min_real();
        (min / 2.0, -min / 2.0)
    }

    /// `n` evenly spaced contour levels spanning [`Self::color_limits`].
    pub fn contour_levels(&self, n: usize) -> Array1<f64> {
        let (lo, hi) = self.color_limits();
        linspace(lo, hi, n)
    }

    /// Index of the x sample closest to the transducer axis.
    pub fn axis_column(&self) -> usize {
        self.x
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (j, &x)| {
                if x.abs() < best.1 {
                    (j, x.abs())
                } else {
                    best
                }
            })
            .0
    }

    /// Levitation nodes on the axis: z positions where `|p|` has a strict local minimum.
    pub fn pressure_nodes(&self) -> Vec<f64> {
        if self.x.is_empty() {
            return Vec::new();
        }
        let magnitude = self.magnitude();
        let column = magnitude.column(self.axis_column()).to_vec();

        column
            .windows(3)
            .enumerate()
            .filter(|(_, w)| w[1] < w[0] && w[1] < w[2])
            .map(|(k, _)| self.z[k + 1])
            .collect()
    }
}
