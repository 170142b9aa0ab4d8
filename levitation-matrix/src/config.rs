use crate::error::{LevitationError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

/// One millimetre in metres.
pub const MM: f64 = 1e-3;

/// Field grid bounds and discretization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub z_min: f64, // reflector plane
    pub z_max: f64, // transducer plane
    pub step: f64,  // discretization step (m)
    #[serde(default = "default_cells")]
    pub cells: f64, // number of discrete cells sharing each surface area
}

fn default_cells() -> f64 {
    100.0
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            x_min: -50.0 * MM,
            x_max: 50.0 * MM,
            z_min: 0.0,
            z_max: 50.0 * MM,
            step: 0.5 * MM,
            cells: default_cells(),
        }
    }
}

impl GridConfig {
    fn validate(&self) -> Result<()> {
        let bounds = [
            ("grid.x_min", self.x_min),
            ("grid.x_max", self.x_max),
            ("grid.z_min", self.z_min),
            ("grid.z_max", self.z_max),
        ];
        for (name, value) in bounds {
            if !value.is_finite() {
                return Err(LevitationError::config(name, value, "must be finite"));
            }
        }
        positive("grid.step", self.step)?;
        positive("grid.x span", self.x_max - self.x_min)?;
        positive("grid.z span", self.z_max - self.z_min)?;
        positive("grid.cells", self.cells)?;
        Ok(())
    }
}

/// Propagation medium (air by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediumConfig {
    pub density: f64,     // kg/m³
    pub sound_speed: f64, // m/s
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            density: 1.214,
            sound_speed: 340.1,
        }
    }
}

impl MediumConfig {
    fn validate(&self) -> Result<()> {
        positive("medium.density", self.density)?;
        positive("medium.sound_speed", self.sound_speed)
    }
}

/// Circular flat transducer with an unexcited central hole
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransducerConfig {
    pub radius: f64,                 // m
    pub hole_radius: f64,            // m, 0 for a plain piston
    pub frequency: f64,              // Hz
    pub displacement_amplitude: f64, // m
}

impl Default for TransducerConfig {
    fn default() -> Self {
        Self {
            radius: 15.0 * MM,
            hole_radius: 2.0 * MM,
            frequency: 56_000.0,
            displacement_amplitude: 6e-6,
        }
    }
}

impl TransducerConfig {
    fn validate(&self) -> Result<()> {
        positive("transducer.radius", self.radius)?;
        positive("transducer.frequency", self.frequency)?;
        if !self.displacement_amplitude.is_finite() {
            return Err(LevitationError::config(
                "transducer.displacement_amplitude",
                self.displacement_amplitude,
                "must be finite",
            ));
        }
        if !(self.hole_radius >= 0.0 && self.hole_radius < self.radius) {
            return Err(LevitationError::config(
                "transducer.hole_radius",
                self.hole_radius,
                "must lie in [0, radius)",
            ));
        }
        Ok(())
    }
}

/// Planar reflector at z = z_min
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectorConfig {
    pub radius: f64, // m, sets the reflector area
    #[serde(default = "default_cell_ratio")]
    pub cell_ratio: f64, // reflector cells per transducer cell
}

fn default_cell_ratio() -> f64 {
    4.0
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        // Half of the default lateral extent of the grid.
        Self {
            radius: 25.0 * MM,
            cell_ratio: default_cell_ratio(),
        }
    }
}

impl ReflectorConfig {
    fn validate(&self) -> Result<()> {
        positive("reflector.radius", self.radius)?;
        positive("reflector.cell_ratio", self.cell_ratio)
    }
}

/// Phase applied to the transducer surface velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseConvention {
    /// Phase angle equal to the angular frequency in radians, `exp(i·ω)`.
    #[default]
    AngularFrequency,
    /// No phase term: the velocity amplitude is real.
    Zero,
}

/// Multiple-scattering series options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatteringConfig {
    #[serde(default = "default_order")]
    pub order: usize, // highest reflection order kept
    #[serde(default)]
    pub phase: PhaseConvention,
}

fn default_order() -> usize {
    4
}

/// Highest accepted reflection order.
///
/// The scale D·Eⁿ grows by 1/λ per order while the bounced surface vector shrinks,
/// and after roughly a hundred orders one overflows as the other underflows.
pub const MAX_SCATTERING_ORDER: usize = 32;

impl Default for ScatteringConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            phase: PhaseConvention::default(),
        }
    }
}

impl ScatteringConfig {
    fn validate(&self) -> Result<()> {
        if self.order > MAX_SCATTERING_ORDER {
            return Err(LevitationError::config(
                "scattering.order",
                self.order as f64,
                "higher than the supported maximum order",
            ));
        }
        Ok(())
    }
}

/// Memory budget and threading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: usize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_memory_limit_mb() -> usize {
    4096
}

fn default_parallel() -> bool {
    true
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            memory_limit_mb: default_memory_limit_mb(),
            parallel: default_parallel(),
        }
    }
}

impl ResourceConfig {
    pub fn limit_bytes(&self) -> usize {
        self.memory_limit_mb.saturating_mul(1024 * 1024)
    }
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_contour_levels")]
    pub contour_levels: usize,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_contour_levels() -> usize {
    10
}

// 6.4 x 4.8 inches at 300 dpi
fn default_image_width() -> u32 {
    1920
}

fn default_image_height() -> u32 {
    1440
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            contour_levels: default_contour_levels(),
            image_width: default_image_width(),
            image_height: default_image_height(),
        }
    }
}

impl VisualizationConfig {
    fn validate(&self) -> Result<()> {
        if self.contour_levels < 2 {
            return Err(LevitationError::config(
                "visualization.contour_levels",
                self.contour_levels as f64,
                "need at least 2 levels",
            ));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(LevitationError::config(
                "visualization.image size",
                self.image_width.min(self.image_height) as f64,
                "image dimensions must be positive",
            ));
        }
        Ok(())
    }
}

/// Complete levitator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub medium: MediumConfig,
    #[serde(default)]
    pub transducer: TransducerConfig,
    #[serde(default)]
    pub reflector: ReflectorConfig,
    #[serde(default)]
    pub scattering: ScatteringConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.medium.validate()?;
        self.transducer.validate()?;
        self.reflector.validate()?;
        self.scattering.validate()?;
        self.visualization.validate()?;
        Ok(())
    }

    /// Log configuration summary
    pub fn print_summary(&self) {
        tracing::info!("=== Levitator Configuration ===");
        tracing::info!(
            "Grid: x [{}, {}] m, z [{}, {}] m, step {} m, {} cells",
            self.grid.x_min,
            self.grid.x_max,
            self.grid.z_min,
            self.grid.z_max,
            self.grid.step,
            self.grid.cells
        );
        tracing::info!(
            "Medium: rho={} kg/m³, c={} m/s",
            self.medium.density,
            self.medium.sound_speed
        );
        tracing::info!(
            "Transducer: R={} m, hole={} m, f={} Hz, U0={} m",
            self.transducer.radius,
            self.transducer.hole_radius,
            self.transducer.frequency,
            self.transducer.displacement_amplitude
        );
        tracing::info!(
            "Reflector: radius={} m, {}x cells",
            self.reflector.radius,
            self.reflector.cell_ratio
        );
        tracing::info!(
            "Scattering: order {}, phase {:?}",
            self.scattering.order,
            self.scattering.phase
        );
        tracing::info!("================================");
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(LevitationError::config(
            parameter,
            value,
            "must be positive and finite",
        ));
    }
    Ok(())
}
