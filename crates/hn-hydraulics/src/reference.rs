//! Nodal-pressure Newton solver.
//!
//! Unknowns are the pressures of every junction except the two held by the
//! reference pump. The residual of a junction is its net mass inflow: pipe
//! flows from the inverted pipe law plus the fixed injections of consumers
//! and secondary pumps. The Jacobian is assembled analytically from the pipe
//! conductances.

use std::collections::VecDeque;

use hn_core::FluidProperties;
use hn_network::{HydraulicNetwork, PumpMode, Side};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, newton_solve};
use crate::pipe_law::PipeLaw;
use crate::settings::SolverSettings;
use crate::solution::{HydraulicSolution, PipeFlow};
use crate::solver::HydraulicSolver;

/// Bundled [`HydraulicSolver`] implementation.
///
/// Keeps the last converged pressures as the starting point of the next
/// solve, which makes consecutive timesteps converge in a few iterations.
#[derive(Debug, Clone)]
pub struct NewtonHydraulics {
    fluid: FluidProperties,
    warm_start: Option<Vec<f64>>,
}

impl NewtonHydraulics {
    pub fn new(fluid: FluidProperties) -> Self {
        Self {
            fluid,
            warm_start: None,
        }
    }

    /// Forget the warm start.
    pub fn reset(&mut self) {
        self.warm_start = None;
    }
}

impl Default for NewtonHydraulics {
    fn default() -> Self {
        Self::new(FluidProperties::default())
    }
}

/// Solve-ready view of the network.
struct Problem {
    laws: Vec<PipeLaw>,
    ends: Vec<(usize, usize)>,
    /// Junction index -> unknown index, `None` for fixed junctions.
    unknown_of: Vec<Option<usize>>,
    /// Pressure of fixed junctions (ignored for unknowns).
    fixed: Vec<f64>,
    /// Net fixed inflow per junction, kg/s.
    injection: Vec<f64>,
    /// Pipes carrying flow, i.e. connected to the reference pump.
    active: Vec<bool>,
    /// Consumers drawing flow in this solve.
    consumer_active: Vec<bool>,
    /// Pumps taking part in this solve.
    pump_active: Vec<bool>,
    unknowns: usize,
}

impl Problem {
    fn build(network: &HydraulicNetwork, fluid: &FluidProperties) -> SolverResult<Self> {
        let reference = network
            .reference_pump()
            .ok_or_else(|| SolverError::ProblemSetup {
                what: "network has no pressure reference pump".to_string(),
            })?;
        let pump = network.pump(reference);
        let (p_flow, p_return) = match pump.mode {
            PumpMode::PressureReference { p_flow, p_return } => (p_flow, p_return),
            PumpMode::FixedMassFlow { .. } => {
                return Err(SolverError::ProblemSetup {
                    what: "reference pump is not in pressure mode".to_string(),
                });
            }
        };

        let n = network.junctions.len();
        let mut fixed: Vec<f64> = network
            .junctions
            .iter()
            .map(|j| match j.side {
                Side::Supply => p_flow,
                Side::Return => p_return,
            })
            .collect();
        fixed[pump.supply_junction.index()] = p_flow;
        fixed[pump.return_junction.index()] = p_return;

        let ends: Vec<(usize, usize)> = network
            .pipes
            .iter()
            .map(|p| (p.from.index(), p.to.index()))
            .collect();
        let laws: Vec<PipeLaw> = network
            .pipes
            .iter()
            .map(|p| PipeLaw::for_pipe(p, fluid))
            .collect();
        if let Some((i, _)) = laws
            .iter()
            .enumerate()
            .find(|(_, l)| !(l.r_lin.is_finite() && l.r_lin > 0.0 && l.r_quad.is_finite()))
        {
            return Err(SolverError::ProblemSetup {
                what: format!("pipe {} has an invalid resistance", network.pipes[i].name),
            });
        }

        // Junctions hydraulically connected to one of the reference junctions.
        let mut adjacency = vec![Vec::new(); n];
        for (p, &(a, b)) in ends.iter().enumerate() {
            adjacency[a].push((p, b));
            adjacency[b].push((p, a));
        }
        let mut connected = vec![false; n];
        let mut queue = VecDeque::new();
        for j in [pump.supply_junction.index(), pump.return_junction.index()] {
            connected[j] = true;
            queue.push_back(j);
        }
        while let Some(j) = queue.pop_front() {
            for &(_, k) in &adjacency[j] {
                if !connected[k] {
                    connected[k] = true;
                    queue.push_back(k);
                }
            }
        }
        let active: Vec<bool> = ends.iter().map(|&(a, _)| connected[a]).collect();

        // Consumers and secondary pumps cut off from the reference pump
        // cannot be fed; they are dropped from this solve.
        let consumer_active: Vec<bool> = network
            .consumers
            .iter()
            .map(|c| connected[c.supply_junction.index()] && connected[c.return_junction.index()])
            .collect();
        let pump_active: Vec<bool> = network
            .pumps
            .iter()
            .map(|p| connected[p.supply_junction.index()] && connected[p.return_junction.index()])
            .collect();

        let mut injection = vec![0.0; n];
        for (c, _) in network.consumers.iter().zip(&consumer_active).filter(|(_, a)| **a) {
            injection[c.supply_junction.index()] -= c.mass_flow;
            injection[c.return_junction.index()] += c.mass_flow;
        }
        for (p, _) in network.pumps.iter().zip(&pump_active).filter(|(_, a)| **a) {
            if let PumpMode::FixedMassFlow { mass_flow } = p.mode {
                injection[p.supply_junction.index()] += mass_flow;
                injection[p.return_junction.index()] -= mass_flow;
            }
        }
        for (c, _) in network
            .consumers
            .iter()
            .zip(&consumer_active)
            .filter(|(c, a)| !**a && c.mass_flow != 0.0)
        {
            warn!(
                consumer = %c.name,
                mass_flow = c.mass_flow,
                "consumer is not connected to the reference pump, its demand is not supplied"
            );
        }
        for (p, _) in network.pumps.iter().zip(&pump_active).filter(|(_, a)| !**a) {
            warn!(pump = %p.name, "plant is not connected to the reference pump and stays idle");
        }

        let held = [pump.supply_junction.index(), pump.return_junction.index()];
        let mut unknown_of = vec![None; n];
        let mut unknowns = 0;
        for j in 0..n {
            if connected[j] && !held.contains(&j) {
                unknown_of[j] = Some(unknowns);
                unknowns += 1;
            }
        }

        Ok(Self {
            laws,
            ends,
            unknown_of,
            fixed,
            injection,
            active,
            consumer_active,
            pump_active,
            unknowns,
        })
    }

    fn pressure(&self, x: &DVector<f64>, j: usize) -> f64 {
        match self.unknown_of[j] {
            Some(u) => x[u],
            None => self.fixed[j],
        }
    }

    fn initial_guess(&self, warm: Option<&[f64]>) -> DVector<f64> {
        let mut x = DVector::zeros(self.unknowns);
        for (j, u) in self.unknown_of.iter().enumerate() {
            if let Some(u) = *u {
                x[u] = warm.map(|w| w[j]).unwrap_or(self.fixed[j]);
            }
        }
        x
    }

    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let mut r = DVector::zeros(self.unknowns);
        for (j, u) in self.unknown_of.iter().enumerate() {
            if let Some(u) = *u {
                r[u] = self.injection[j];
            }
        }
        for (p, &(a, b)) in self.ends.iter().enumerate() {
            if !self.active[p] {
                continue;
            }
            let m = self.laws[p].mass_flow(self.pressure(x, a) - self.pressure(x, b));
            if let Some(u) = self.unknown_of[a] {
                r[u] -= m;
            }
            if let Some(u) = self.unknown_of[b] {
                r[u] += m;
            }
        }
        Ok(r)
    }

    fn jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        let mut jac = DMatrix::zeros(self.unknowns, self.unknowns);
        for (p, &(a, b)) in self.ends.iter().enumerate() {
            if !self.active[p] {
                continue;
            }
            let g = self.laws[p].conductance(self.pressure(x, a) - self.pressure(x, b));
            let (ua, ub) = (self.unknown_of[a], self.unknown_of[b]);
            if let Some(ua) = ua {
                jac[(ua, ua)] -= g;
                if let Some(ub) = ub {
                    jac[(ua, ub)] += g;
                }
            }
            if let Some(ub) = ub {
                jac[(ub, ub)] -= g;
                if let Some(ua) = ua {
                    jac[(ub, ua)] += g;
                }
            }
        }
        Ok(jac)
    }
}

impl HydraulicSolver for NewtonHydraulics {
    fn name(&self) -> &str {
        "newton-nodal"
    }

    fn solve(
        &mut self,
        network: &HydraulicNetwork,
        settings: &SolverSettings,
    ) -> SolverResult<HydraulicSolution> {
        let problem = Problem::build(network, &self.fluid)?;
        let warm = self
            .warm_start
            .as_deref()
            .filter(|w| w.len() == network.junctions.len());
        let x0 = problem.initial_guess(warm);

        let config = NewtonConfig::from(settings);
        let result = newton_solve(
            x0,
            |x| problem.residual(x),
            |x| problem.jacobian(x),
            &config,
        )?;

        let junction_pressures: Vec<f64> = (0..network.junctions.len())
            .map(|j| problem.pressure(&result.x, j))
            .collect();
        let pipe_flows: Vec<PipeFlow> = problem
            .ends
            .iter()
            .enumerate()
            .map(|(p, &(a, b))| {
                let (p_from, p_to) = (junction_pressures[a], junction_pressures[b]);
                let mass_flow = if problem.active[p] {
                    problem.laws[p].mass_flow(p_from - p_to)
                } else {
                    0.0
                };
                PipeFlow {
                    mass_flow,
                    p_from,
                    p_to,
                }
            })
            .collect();

        let pump_flows = network
            .pumps
            .iter()
            .zip(&problem.pump_active)
            .map(|(pump, &active)| match pump.mode {
                _ if !active => 0.0,
                PumpMode::FixedMassFlow { mass_flow } => mass_flow,
                PumpMode::PressureReference { .. } => {
                    let j = pump.supply_junction.index();
                    problem
                        .ends
                        .iter()
                        .zip(&pipe_flows)
                        .map(|(&(a, b), f)| {
                            if a == j {
                                f.mass_flow
                            } else if b == j {
                                -f.mass_flow
                            } else {
                                0.0
                            }
                        })
                        .sum()
                }
            })
            .collect();

        debug!(
            iterations = result.iterations,
            residual = result.residual_norm,
            unknowns = problem.unknowns,
            "hydraulic solve converged"
        );
        self.warm_start = Some(junction_pressures.clone());

        Ok(HydraulicSolution {
            junction_pressures,
            pipe_flows,
            consumer_flows: network
                .consumers
                .iter()
                .zip(&problem.consumer_active)
                .map(|(c, &active)| if active { c.mass_flow } else { 0.0 })
                .collect(),
            pump_flows,
            iterations: result.iterations,
            residual_norm: result.residual_norm,
        })
    }
}
