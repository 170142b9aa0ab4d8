use crate::config::GridConfig;
use crate::error::{LevitationError, Result};
use ndarray::Array1;
use num_complex::Complex64;

/// Sample coordinates of the field grid and the transducer aperture.
///
/// The transducer lies in the plane `z = z_transducer` (the top of the grid) and the
/// reflector in `z = z_reflector` (the bottom). Reflector cells share the x samples
/// of the field grid.
#[derive(Debug, Clone)]
pub struct Grid {
    pub x: Array1<f64>,          // L lateral samples
    pub z: Array1<f64>,          // Z axial samples
    pub transducer: Array1<f64>, // N aperture samples
    pub z_transducer: f64,
    pub z_reflector: f64,
}

impl Grid {
    pub fn new(config: &GridConfig, transducer_radius: f64) -> Result<Self> {
        let nx = sample_count("grid.x span", config.x_max - config.x_min, config.step)?;
        let nz = sample_count("grid.z span", config.z_max - config.z_min, config.step)?;
        let nt = sample_count("transducer diameter", 2.0 * transducer_radius, config.step)?;

        Ok(Grid {
            x: linspace(config.x_min, config.x_max, nx),
            z: linspace(config.z_min, config.z_max, nz),
            transducer: linspace(-transducer_radius, transducer_radius, nt),
            z_transducer: config.z_max,
            z_reflector: config.z_min,
        })
    }

    /// N, the number of transducer cells
    pub fn n_transducer(&self) -> usize {
        self.transducer.len()
    }

    /// L, the number of lateral samples (and reflector cells)
    pub fn n_x(&self) -> usize {
        self.x.len()
    }

    /// Z, the number of axial samples
    pub fn n_z(&self) -> usize {
        self.z.len()
    }

    /// M = L·Z field points
    pub fn n_field(&self) -> usize {
        self.n_x() * self.n_z()
    }

    /// Coordinates of field point `q`, enumerated x-major then z.
    pub fn field_point(&self, q: usize) -> (f64, f64) {
        let nz = self.n_z();
        (self.x[q / nz], self.z[q % nz])
    }

    /// Bytes needed by the dense distance (f64) and transfer (complex) matrices,
    /// plus the field vectors kept for scattering orders `0..=order`.
    ///
    /// Returns `None` when the count overflows `usize`.
    pub fn required_bytes(&self, order: usize) -> Option<usize> {
        let n = self.n_transducer();
        let l = self.n_x();
        let m = self.n_field();

        let nm = n.checked_mul(m)?;
        let lm = l.checked_mul(m)?;
        let nl = n.checked_mul(l)?;

        // r_nm, r_im, r_in; then T_tf, T_rf, T_tr, T_rt
        let distances = nm.checked_add(lm)?.checked_add(nl)?;
        let transfers = nm.checked_add(lm)?.checked_add(nl.checked_mul(2)?)?;

        let distance_bytes = distances.checked_mul(std::mem::size_of::<f64>())?;
        let transfer_bytes = transfers.checked_mul(std::mem::size_of::<Complex64>())?;

        // one contribution per order plus the running total
        let field_vectors = order.checked_add(2)?.checked_mul(m)?;
        let field_bytes = field_vectors.checked_mul(std::mem::size_of::<Complex64>())?;

        distance_bytes.checked_add(transfer_bytes)?.checked_add(field_bytes)
    }

    /// Fails with [`LevitationError::Resource`] when a run up to `order` would exceed
    /// `limit_bytes`.
    pub fn check_memory(&self, order: usize, limit_bytes: usize) -> Result<usize> {
        match self.required_bytes(order) {
            Some(required) if required <= limit_bytes => Ok(required),
            Some(required) => Err(LevitationError::Resource {
                required_bytes: required,
                limit_bytes,
            }),
            None => Err(LevitationError::Resource {
                required_bytes: usize::MAX,
                limit_bytes,
            }),
        }
    }
}

/// Number of samples covering `span` at spacing `step`, truncated.
pub fn sample_count(name: &'static str, span: f64, step: f64) -> Result<usize> {
    if !(step.is_finite() && step > 0.0) {
        return Err(LevitationError::config("grid.step", step, "must be positive and finite"));
    }
    if !(span.is_finite() && span > 0.0) {
        return Err(LevitationError::config(name, span, "must be positive and finite"));
    }
    let count = (span / step).trunc();
    if count < 1.0 {
        return Err(LevitationError::config(
            name,
            span,
            "shorter than one discretization step",
        ));
    }
    if count > usize::MAX as f64 {
        return Err(LevitationError::config(name, span, "too many samples"));
    }
    Ok(count as usize)
}

/// `n` evenly spaced samples over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => {
            let delta = (stop - start) / (n - 1) as f64;
            let mut samples = Array1::from_shape_fn(n, |i| start + i as f64 * delta);
            samples[n - 1] = stop;
            samples
        }
    }
}
