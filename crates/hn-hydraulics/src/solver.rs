use hn_network::HydraulicNetwork;

use crate::error::SolverResult;
use crate::settings::SolverSettings;
use crate::solution::HydraulicSolution;

/// A steady-state hydraulic solver.
///
/// Implementations read the pump modes and the consumer mass flow setpoints
/// from `network` and must return a solution shaped like its arenas. Pipe mass
/// flows are signed relative to each pipe's nominal orientation. Solvers may
/// keep state between calls (e.g. a warm start).
pub trait HydraulicSolver: Send {
    fn name(&self) -> &str;

    fn solve(
        &mut self,
        network: &HydraulicNetwork,
        settings: &SolverSettings,
    ) -> SolverResult<HydraulicSolution>;
}
