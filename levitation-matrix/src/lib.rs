//! Matrix method for an acoustic levitator made of one circular flat transducer
//! facing a planar reflector.
//!
//! The transducer and reflector are cut into small cells. Distance-dependent
//! transfer matrices couple the cells to each other and to a 2D grid of field
//! points, and a truncated multiple-reflection series gives the complex pressure
//! on that grid. Pressure nodes of the standing wave are the levitation sites.
//!
//! Data flows one way, driven by [`simulation::Simulation`]:
//! [`grid`] → [`distance`] → [`transfer`] → [`scattering`] → [`pressure`],
//! with [`visualisation`] rendering the result.

pub mod boundary;
pub mod config;
pub mod distance;
pub mod error;
pub mod grid;
pub mod physics;
pub mod pressure;
pub mod scattering;
pub mod simulation;
pub mod transfer;
pub mod visualisation;

pub use config::{Config, PhaseConvention};
pub use error::{LevitationError, Result};
pub use pressure::PressureField;
pub use simulation::{LevitationField, Simulation};
