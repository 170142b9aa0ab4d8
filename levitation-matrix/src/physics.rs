use crate::config::{MediumConfig, TransducerConfig};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Derived acoustic constants, computed once from the medium and drive frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub density: f64,           // kg/m³
    pub sound_speed: f64,       // m/s
    pub frequency: f64,         // Hz
    pub angular_frequency: f64, // rad/s
    pub wavenumber: f64,        // rad/m
    pub wavelength: f64,        // m

    // Series scaling: D for the transmitted wave, E per reflection
    pub transmission_scale: Complex64,
    pub reflection_scale: Complex64,
}

impl PhysicalConstants {
    pub fn new(medium: &MediumConfig, transducer: &TransducerConfig) -> Self {
        let density = medium.density;
        let sound_speed = medium.sound_speed;
        let frequency = transducer.frequency;

        let wavelength = sound_speed / frequency;
        let angular_frequency = 2.0 * PI * frequency;
        let wavenumber = angular_frequency / sound_speed;

        // D = ω·ρ·c/λ and E = i/λ
        let transmission_scale =
            Complex64::new(angular_frequency * density * sound_speed / wavelength, 0.0);
        let reflection_scale = Complex64::new(0.0, 1.0 / wavelength);

        Self {
            density,
            sound_speed,
            frequency,
            angular_frequency,
            wavenumber,
            wavelength,
            transmission_scale,
            reflection_scale,
        }
    }

    /// Scale applied to the n-th scattering order, `D·Eⁿ`.
    pub fn order_scale(&self, order: usize) -> Complex64 {
        let mut scale = self.transmission_scale;
        for _ in 0..order {
            scale *= self.reflection_scale;
        }
        scale
    }
}

/// Per-cell radiating areas of the two surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellAreas {
    pub transducer: f64, // full disk / cells
    pub hole: f64,       // central hole / cells
    pub reflector: f64,  // reflector disk / (cells · ratio)
}

impl CellAreas {
    pub fn new(
        transducer_radius: f64,
        hole_radius: f64,
        reflector_radius: f64,
        cells: f64,
        reflector_ratio: f64,
    ) -> Self {
        Self {
            transducer: disk_area(transducer_radius) / cells,
            hole: disk_area(hole_radius) / cells,
            reflector: disk_area(reflector_radius) / (cells * reflector_ratio),
        }
    }
}

fn disk_area(radius: f64) -> f64 {
    PI * radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_constants() {
        let constants =
            PhysicalConstants::new(&MediumConfig::default(), &TransducerConfig::default());
        assert_relative_eq!(
            constants.wavenumber,
            2.0 * PI * 56_000.0 / 340.1,
            max_relative = 1e-15
        );
        assert_relative_eq!(constants.wavelength, 340.1 / 56_000.0, max_relative = 1e-15);
        assert_relative_eq!(
            constants.wavenumber * constants.wavelength,
            2.0 * PI,
            max_relative = 1e-12
        );
        assert_eq!(constants.reflection_scale.re, 0.0);
        assert_eq!(constants.transmission_scale.im, 0.0);
    }

    #[test]
    fn test_order_scale_powers() {
        let constants =
            PhysicalConstants::new(&MediumConfig::default(), &TransducerConfig::default());
        assert_eq!(constants.order_scale(0), constants.transmission_scale);
        let e = constants.reflection_scale;
        let expected = constants.transmission_scale * e * e * e;
        assert_eq!(constants.order_scale(3), expected);
        // E² = -1/λ², so the second order flips sign
        let second = constants.order_scale(2);
        assert!(second.re < 0.0);
    }

    #[test]
    fn test_cell_areas() {
        let areas = CellAreas::new(15e-3, 2e-3, 25e-3, 100.0, 4.0);
        assert_relative_eq!(areas.transducer, PI * 15e-3 * 15e-3 / 100.0, max_relative = 1e-12);
        assert_relative_eq!(areas.hole, PI * 4e-6 / 100.0, max_relative = 1e-12);
        assert_relative_eq!(areas.reflector, PI * 625e-6 / 400.0, max_relative = 1e-12);
    }
}
