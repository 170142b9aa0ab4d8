//! Truncated multiple-scattering series between transducer and reflector.
//!
//! ```text
//! P = D·T_tf·U
//!   + D·E  · T_rf·T_tr·U
//!   + D·E² · T_tf·T_rt·T_tr·U
//!   + D·E³ · T_rf·T_tr·T_rt·T_tr·U
//!   + D·E⁴ · T_tf·T_rt·T_tr·T_rt·T_tr·U
//! ```
//! The products are evaluated right to left as matrix-vector products. A surface
//! vector alternates between the transducer (length N) and the reflector
//! (length L); each order adds one bounce and radiates the result into the field.

use crate::error::{ensure_shape, Result};
use crate::physics::PhysicalConstants;
use crate::transfer::TransferMatrices;
use ndarray::Array1;
use num_complex::Complex64;

/// Which surface currently carries the bounced wave.
#[derive(Debug, Clone)]
enum Surface {
    Transducer(Array1<Complex64>),
    Reflector(Array1<Complex64>),
}

/// Pressure over the field grid and its per-order breakdown.
#[derive(Debug, Clone)]
pub struct ScatteringResult {
    /// Total pressure, one entry per field point (length M)
    pub pressure: Array1<Complex64>,
    /// Scaled contribution of each order `0..=order`
    pub contributions: Vec<Array1<Complex64>>,
}

impl ScatteringResult {
    /// Mean of `|term|` over the field for every order.
    pub fn mean_magnitudes(&self) -> Vec<f64> {
        self.contributions
            .iter()
            .map(|term| {
                if term.is_empty() {
                    0.0
                } else {
                    term.iter().map(|v| v.norm()).sum::<f64>() / term.len() as f64
                }
            })
            .collect()
    }
}

/// Sums the series up to `order` reflections for the surface velocity `velocity`.
pub fn evaluate(
    transfer: &TransferMatrices,
    velocity: &Array1<Complex64>,
    constants: &PhysicalConstants,
    order: usize,
) -> Result<ScatteringResult> {
    let (n, l, m) = transfer.dims();
    transfer.validate(n, l, m)?;
    ensure_shape("boundary velocity", &[n], velocity.shape())?;

    let mut pressure = Array1::<Complex64>::zeros(m);
    let mut contributions = Vec::with_capacity(order + 1);
    let mut surface = Surface::Transducer(velocity.clone());
    let mut scale = constants.transmission_scale;

    for n_order in 0..=order {
        if n_order > 0 {
            scale *= constants.reflection_scale;
        }

        let radiated = match &surface {
            Surface::Transducer(v) => transfer.transducer_field.dot(v),
            Surface::Reflector(w) => transfer.reflector_field.dot(w),
        };
        let term = radiated.mapv(|p| scale * p);
        pressure += &term;
        contributions.push(term);

        if n_order < order {
            surface = bounce(transfer, surface);
        }
    }

    tracing::debug!("summed {} scattering orders over {} field points", order + 1, m);

    Ok(ScatteringResult {
        pressure,
        contributions,
    })
}

fn bounce(transfer: &TransferMatrices, surface: Surface) -> Surface {
    match surface {
        Surface::Transducer(v) => Surface::Reflector(transfer.transducer_reflector.dot(&v)),
        Surface::Reflector(w) => Surface::Transducer(transfer.reflector_transducer.dot(&w)),
    }
}
