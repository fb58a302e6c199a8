//! Steady-state hydraulic boundary for the transient engine.
//!
//! The simulation only talks to [`HydraulicSolver`]: given the network with
//! its current pump and consumer setpoints it returns junction pressures and
//! signed pipe mass flows. [`NewtonHydraulics`] is the bundled implementation,
//! a nodal-pressure Newton method over the quadratic pipe law.

pub mod error;
pub mod newton;
pub mod pipe_law;
pub mod reference;
pub mod settings;
pub mod solution;
pub mod solver;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use pipe_law::PipeLaw;
pub use reference::NewtonHydraulics;
pub use settings::SolverSettings;
pub use solution::{HydraulicSolution, PipeFlow};
pub use solver::HydraulicSolver;
