use crate::config::PhaseConvention;
use ndarray::Array1;
use num_complex::Complex64;

/// Piston-like surface velocity of the transducer, one entry per cell.
///
/// Every cell moves with the displacement amplitude `u0`. The phase follows
/// `convention`: [`PhaseConvention::AngularFrequency`] multiplies by `exp(i·ω)`,
/// using ω in rad/s directly as an angle.
pub fn boundary_velocity(
    cells: usize,
    u0: f64,
    angular_frequency: f64,
    convention: PhaseConvention,
) -> Array1<Complex64> {
    let phase = match convention {
        PhaseConvention::AngularFrequency => angular_frequency,
        PhaseConvention::Zero => 0.0,
    };
    Array1::from_elem(cells, Complex64::from_polar(u0, phase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_amplitude() {
        let omega = 2.0 * std::f64::consts::PI * 56_000.0;
        let u = boundary_velocity(60, 6e-6, omega, PhaseConvention::AngularFrequency);
        assert_eq!(u.len(), 60);
        assert!(u.iter().all(|&v| v == u[0]));
        assert_relative_eq!(u[0].norm(), 6e-6, max_relative = 1e-12);
        assert_relative_eq!(u[0].re, 6e-6 * omega.cos(), max_relative = 1e-9);
    }

    #[test]
    fn test_zero_phase_is_real() {
        let u = boundary_velocity(3, 2.0, 1234.5, PhaseConvention::Zero);
        assert_eq!(u.to_vec(), vec![Complex64::new(2.0, 0.0); 3]);
    }
}
