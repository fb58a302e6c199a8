//! Result of one hydraulic solve.

use hn_network::HydraulicNetwork;

use crate::error::{SolverError, SolverResult};

/// Flow state of one pipe.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipeFlow {
    /// kg/s, positive along the pipe's nominal `from -> to` orientation.
    pub mass_flow: f64,
    /// Pa
    pub p_from: f64,
    /// Pa
    pub p_to: f64,
}

/// Per-component values, indexed like the network arenas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HydraulicSolution {
    /// Pa
    pub junction_pressures: Vec<f64>,
    pub pipe_flows: Vec<PipeFlow>,
    /// kg/s through each consumer (supply to return).
    pub consumer_flows: Vec<f64>,
    /// kg/s delivered by each pump into the supply line.
    pub pump_flows: Vec<f64>,
    pub iterations: usize,
    pub residual_norm: f64,
}

impl HydraulicSolution {
    /// Check the solution covers every component of `network` and holds only
    /// finite values.
    pub fn check_shape(&self, network: &HydraulicNetwork) -> SolverResult<()> {
        let shape = [
            ("junction pressures", self.junction_pressures.len(), network.junctions.len()),
            ("pipe flows", self.pipe_flows.len(), network.pipes.len()),
            ("consumer flows", self.consumer_flows.len(), network.consumers.len()),
            ("pump flows", self.pump_flows.len(), network.pumps.len()),
        ];
        for (what, got, expected) in shape {
            if got != expected {
                return Err(SolverError::ProblemSetup {
                    what: format!("{what}: expected {expected} values, got {got}"),
                });
            }
        }

        let finite = self.junction_pressures.iter().all(|v| v.is_finite())
            && self
                .pipe_flows
                .iter()
                .all(|f| f.mass_flow.is_finite() && f.p_from.is_finite() && f.p_to.is_finite())
            && self.consumer_flows.iter().all(|v| v.is_finite())
            && self.pump_flows.iter().all(|v| v.is_finite());
        if !finite {
            return Err(SolverError::Numeric {
                what: "hydraulic solution contains non-finite values".to_string(),
            });
        }
        Ok(())
    }
}
