use crate::boundary::boundary_velocity;
use crate::config::Config;
use crate::distance::DistanceFields;
use crate::error::Result;
use crate::grid::Grid;
use crate::physics::{CellAreas, PhysicalConstants};
use crate::pressure::PressureField;
use crate::scattering::{self, ScatteringResult};
use crate::transfer::TransferMatrices;
use crate::visualisation::FieldVisualiser;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Output of one levitator run.
#[derive(Debug, Clone)]
pub struct LevitationField {
    pub field: PressureField,
    pub scattering: ScatteringResult,
}

/// One configured transducer/reflector pair, ready to evaluate.
pub struct Simulation {
    pub config: Config,
    pub grid: Grid,
    pub constants: PhysicalConstants,
    pub areas: CellAreas,
    estimated_bytes: usize,
}

impl Simulation {
    /// Validates the configuration, builds the grid and checks the memory budget.
    ///
    /// Nothing larger than the coordinate vectors is allocated here.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let grid = Grid::new(&config.grid, config.transducer.radius)?;
        let estimated_bytes =
            grid.check_memory(config.scattering.order, config.resources.limit_bytes())?;

        let constants = PhysicalConstants::new(&config.medium, &config.transducer);
        let areas = CellAreas::new(
            config.transducer.radius,
            config.transducer.hole_radius,
            config.reflector.radius,
            config.grid.cells,
            config.reflector.cell_ratio,
        );

        tracing::debug!(
            "N={} L={} Z={} M={}, k={:.4} rad/m, lambda={:.6} m",
            grid.n_transducer(),
            grid.n_x(),
            grid.n_z(),
            grid.n_field(),
            constants.wavenumber,
            constants.wavelength
        );

        Ok(Self {
            config,
            grid,
            constants,
            areas,
            estimated_bytes,
        })
    }

    /// Estimated peak size of the matrices and per-order field vectors in bytes
    pub fn estimated_bytes(&self) -> usize {
        self.estimated_bytes
    }

    pub fn run(&self) -> Result<LevitationField> {
        let parallel = self.config.resources.parallel;
        tracing::info!(
            "Computing field on {}x{} grid ({} transducer cells, ~{:.1} MiB)",
            self.grid.n_x(),
            self.grid.n_z(),
            self.grid.n_transducer(),
            self.estimated_bytes as f64 / (1024.0 * 1024.0)
        );

        let start = Instant::now();
        let distances = DistanceFields::new(&self.grid, parallel)?;
        tracing::info!("Distance matrices built in {:.2?}", start.elapsed());

        let start = Instant::now();
        let transfer = TransferMatrices::assemble(
            &distances,
            &self.areas,
            self.constants.wavenumber,
            parallel,
        )?;
        drop(distances);
        tracing::info!("Transfer matrices assembled in {:.2?}", start.elapsed());

        let velocity = boundary_velocity(
            self.grid.n_transducer(),
            self.config.transducer.displacement_amplitude,
            self.constants.angular_frequency,
            self.config.scattering.phase,
        );

        let start = Instant::now();
        let scattering = scattering::evaluate(
            &transfer,
            &velocity,
            &self.constants,
            self.config.scattering.order,
        )?;
        tracing::info!(
            "Scattering series up to order {} summed in {:.2?}",
            self.config.scattering.order,
            start.elapsed()
        );

        let field = PressureField::from_vector(&scattering.pressure, &self.grid.x, &self.grid.z)?;
        Ok(LevitationField { field, scattering })
    }

    /// Runs the computation and writes `contour.png` and `continuous.png`.
    pub fn run_with_visualisation(&self) -> Result<(LevitationField, Vec<PathBuf>)> {
        let result = self.run()?;

        let vis = &self.config.visualization;
        let visualiser = FieldVisualiser::new(&vis.output_dir, vis.image_width, vis.image_height)?;

        let contour = Path::new(&vis.output_dir).join("contour.png");
        visualiser.plot_contour(&result.field, vis.contour_levels, &contour)?;

        let continuous = Path::new(&vis.output_dir).join("continuous.png");
        visualiser.plot_continuous(&result.field, &continuous)?;

        Ok((result, vec![contour, continuous]))
    }
}
