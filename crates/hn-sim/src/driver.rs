//! Simulation Driver: the per-timestep state machine.

use hn_core::{FluidProperties, HnError, JunctionId, PipeId, ensure_positive};
use hn_graph::NetworkGraph;
use hn_hydraulics::{
    HydraulicSolution, HydraulicSolver, NewtonHydraulics, SolverError, SolverResult, SolverSettings,
};
use hn_network::{AssembleOptions, HydraulicNetwork, Side, assemble};
use hn_results::Recorder;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::consumer::{DemandMode, demand_at, outlet_temperature};
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult, ThermalError};
use crate::layers::{Direction, LayerMap, needs_reorientation, resolve_layers};
use crate::mixer::{Inflow, mix};
use crate::snapshot;
use crate::thermal::{PipeUpdate, advance_pipe};
use crate::writeback::NetworkMaps;

/// Stage the driver is in (or last was in, for `Finished` and `Error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initializing,
    PerTimestepHydraulics,
    SupplyPropagation,
    ConsumerBalance,
    ReturnPropagation,
    Logging,
    Finished,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProgress {
    /// Completed steps.
    pub step: usize,
    pub total: usize,
    /// Simulated time reached, s.
    pub time_s: f64,
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimStats {
    pub hydraulic_solves: usize,
    /// Solves that only succeeded with relaxed settings.
    pub solver_retries: usize,
    /// Layer re-resolutions after a flow direction change.
    pub reorientations: usize,
    /// Pipe updates that fell back to pure conduction.
    pub thermal_fallbacks: usize,
}

/// A transient run over one network.
pub struct Simulation<S: HydraulicSolver = NewtonHydraulics> {
    ctx: SimulationContext,
    network: HydraulicNetwork,
    maps: NetworkMaps,
    solver: S,
    supply_layers: LayerMap,
    return_layers: LayerMap,
    /// Ground temperature per pipe for the current sample, K.
    ground: Vec<f64>,
    recorder: Recorder,
    stage: Stage,
    step: usize,
    total_steps: usize,
    sample: usize,
    stats: SimStats,
}

impl Simulation<NewtonHydraulics> {
    /// Build a run that uses the bundled Newton solver.
    pub fn with_reference_solver(graph: &NetworkGraph, ctx: SimulationContext) -> SimResult<Self> {
        let solver = NewtonHydraulics::new(ctx.fluid);
        Self::new(graph, ctx, solver)
    }
}

impl<S: HydraulicSolver> Simulation<S> {
    /// Assemble the network, set the initial state, solve the first
    /// hydraulic sample and resolve both sides' layers.
    pub fn new(graph: &NetworkGraph, ctx: SimulationContext, solver: S) -> SimResult<Self> {
        let span = ctx.span.clone();
        let _enter = span.enter();

        ctx.config.validate()?;
        check_fluid(&ctx.fluid)?;

        let options = AssembleOptions {
            snap_to_catalog: ctx.config.snap_to_catalog,
            initial_temperature: ctx.config.initial_temperature,
        };
        let (network, junctions, pipes) = assemble(graph, &options)?;
        check_demand_coverage(&network, &ctx)?;

        let recorder = Recorder::new(snapshot::layout(&network), ctx.config.history);
        let total_steps = ctx.config.steps();
        let mut sim = Self {
            ground: vec![0.0; network.pipes.len()],
            network,
            maps: NetworkMaps { junctions, pipes },
            solver,
            supply_layers: LayerMap::empty(Side::Supply),
            return_layers: LayerMap::empty(Side::Return),
            recorder,
            stage: Stage::Initializing,
            step: 0,
            total_steps,
            sample: 0,
            stats: SimStats::default(),
            ctx,
        };

        if let Err(e) = sim.initialize() {
            sim.stage = Stage::Error;
            return Err(e);
        }
        Ok(sim)
    }

    fn initialize(&mut self) -> SimResult<()> {
        for pump in &self.network.pumps {
            self.network.junctions[pump.supply_junction.index()].temperature = pump.t_flow;
        }
        self.push_boundary(0);
        self.solve_hydraulics(0)?;

        let tol = self.ctx.tolerances;
        self.supply_layers =
            resolve_layers(&mut self.network, Side::Supply, Direction::Downstream, &tol)?;
        self.return_layers =
            resolve_layers(&mut self.network, Side::Return, Direction::Upstream, &tol)?;

        self.stage = Stage::PerTimestepHydraulics;
        info!(
            network = %self.network.name,
            steps = self.total_steps,
            supply_layers = self.supply_layers.max_layer(),
            return_layers = self.return_layers.max_layer(),
            solver = self.solver.name(),
            "simulation initialized"
        );
        Ok(())
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn network(&self) -> &HydraulicNetwork {
        &self.network
    }

    pub fn maps(&self) -> &NetworkMaps {
        &self.maps
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn into_recorder(self) -> Recorder {
        self.recorder
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn layers(&self, side: Side) -> &LayerMap {
        match side {
            Side::Supply => &self.supply_layers,
            Side::Return => &self.return_layers,
        }
    }

    /// Completed steps.
    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Run all remaining steps and hand out the recorded results.
    pub fn run(self) -> SimResult<Recorder> {
        self.run_with_progress(|_| {})
    }

    pub fn run_with_progress(mut self, progress: impl FnMut(SimProgress)) -> SimResult<Recorder> {
        self.run_to_end(progress)?;
        Ok(self.recorder)
    }

    /// Run all remaining steps, keeping the simulation for inspection.
    pub fn run_to_end(&mut self, mut progress: impl FnMut(SimProgress)) -> SimResult<()> {
        let span = self.ctx.span.clone();
        let _enter = span.enter();
        info!(steps = self.total_steps - self.step, "starting transient run");

        while self.step_once()? {
            progress(SimProgress {
                step: self.step,
                total: self.total_steps,
                time_s: self.ctx.config.time_of(self.step),
            });
        }

        info!(
            steps = self.step,
            hydraulic_solves = self.stats.hydraulic_solves,
            solver_retries = self.stats.solver_retries,
            reorientations = self.stats.reorientations,
            thermal_fallbacks = self.stats.thermal_fallbacks,
            "transient run finished"
        );
        Ok(())
    }

    /// Advance one timestep. Returns `false` once the run is finished.
    pub fn step_once(&mut self) -> SimResult<bool> {
        match self.stage {
            Stage::Finished => return Ok(false),
            Stage::Error => {
                return Err(SimError::InvalidArg {
                    what: "simulation stopped after an error",
                });
            }
            _ => {}
        }
        if self.step >= self.total_steps {
            self.stage = Stage::Finished;
            return Ok(false);
        }

        match self.advance() {
            Ok(()) => {
                self.step += 1;
                self.stage = if self.step >= self.total_steps {
                    Stage::Finished
                } else {
                    Stage::PerTimestepHydraulics
                };
                Ok(true)
            }
            Err(e) => {
                error!(step = self.step, stage = ?self.stage, error = %e, "simulation aborted");
                self.stage = Stage::Error;
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> SimResult<()> {
        let step = self.step;
        let config = &self.ctx.config;
        let sample = config.sample_of(step);
        let time = config.time_of(step + 1);

        self.stage = Stage::PerTimestepHydraulics;
        if sample != self.sample {
            self.sample = sample;
            self.push_boundary(sample);
            self.solve_hydraulics(step)?;
            self.reorient()?;
        }

        self.stage = Stage::SupplyPropagation;
        for pump in &self.network.pumps {
            self.network.junctions[pump.supply_junction.index()].temperature = pump.t_flow;
        }
        self.propagate(Side::Supply, step)?;

        self.stage = Stage::ConsumerBalance;
        self.balance_consumers();

        self.stage = Stage::ReturnPropagation;
        self.propagate(Side::Return, step)?;
        for pump in self.network.pumps.iter_mut() {
            pump.return_temperature = self.network.junctions[pump.return_junction.index()].temperature;
        }

        self.stage = Stage::Logging;
        let cp = self.ctx.fluid.cp();
        self.recorder.record(time, &snapshot::frame(&self.network, cp))?;
        self.recorder
            .record_profiles(self.network.pipes.iter().map(|p| p.profile()));

        debug!(step, time, sample, "step finished");
        Ok(())
    }

    /// Load demand setpoints and ground temperatures of `sample`.
    fn push_boundary(&mut self, sample: usize) {
        let cp = self.ctx.fluid.cp();
        let mode = self.ctx.config.demand_mode;
        for consumer in self.network.consumers.iter_mut() {
            consumer.demand = demand_at(consumer, sample, mode);
            consumer.mass_flow = consumer.setpoint(cp);
        }
        let ground = &self.ctx.config.ground;
        for (t, pipe) in self.ground.iter_mut().zip(&self.network.pipes) {
            *t = ground.temperature(pipe.ground_depth.value, sample);
        }
    }

    fn solve_hydraulics(&mut self, step: usize) -> SimResult<()> {
        let settings = self.ctx.config.solver;
        let solution = match attempt(&mut self.solver, &self.network, &settings) {
            Ok(solution) => solution,
            Err(source @ SolverError::ProblemSetup { .. }) => {
                return Err(SimError::Solver { step, source });
            }
            Err(first) => {
                warn!(step, error = %first, "hydraulic solve failed, retrying with relaxed settings");
                let solution = attempt(&mut self.solver, &self.network, &settings.relaxed())
                    .map_err(|source| SimError::Solver { step, source })?;
                self.stats.solver_retries += 1;
                solution
            }
        };
        self.stats.hydraulic_solves += 1;
        debug!(
            step,
            iterations = solution.iterations,
            residual = solution.residual_norm,
            "hydraulics solved"
        );
        apply_solution(&mut self.network, &solution, self.ctx.fluid.rho());
        Ok(())
    }

    /// Re-resolve the layers of any side whose flow changed direction.
    fn reorient(&mut self) -> SimResult<()> {
        let tol = self.ctx.tolerances;
        if needs_reorientation(&self.network, Side::Supply, &tol) {
            self.supply_layers =
                resolve_layers(&mut self.network, Side::Supply, Direction::Downstream, &tol)?;
            self.stats.reorientations += 1;
            info!(step = self.step, side = "supply", "flow direction changed, layers re-resolved");
        }
        if needs_reorientation(&self.network, Side::Return, &tol) {
            self.return_layers =
                resolve_layers(&mut self.network, Side::Return, Direction::Upstream, &tol)?;
            self.stats.reorientations += 1;
            info!(step = self.step, side = "return", "flow direction changed, layers re-resolved");
        }
        Ok(())
    }

    /// Advance all layers of one side in ascending order, mixing the
    /// junctions fed by each layer after its pipes are done.
    fn propagate(&mut self, side: Side, step: usize) -> SimResult<()> {
        let layers = match side {
            Side::Supply => &self.supply_layers,
            Side::Return => &self.return_layers,
        };
        let network = &mut self.network;
        let dt = self.ctx.config.timestep;
        let fluid = self.ctx.fluid;
        let tol = self.ctx.tolerances;
        let parallel = self.ctx.config.parallel;
        let threshold = self.ctx.config.parallel_threshold;
        let ground = &self.ground;

        let n_junctions = network.junctions.len();
        let mut incoming: Vec<Vec<PipeId>> = vec![Vec::new(); n_junctions];
        for id in network.pipes_on(side) {
            incoming[network.pipe(id).outlet().index()].push(id);
        }
        let mut injections: Vec<Vec<Inflow>> = vec![Vec::new(); n_junctions];
        match side {
            Side::Supply => {
                for pump in &network.pumps {
                    injections[pump.supply_junction.index()].push(Inflow {
                        mass_flow: pump.mass_flow,
                        temperature: pump.t_flow,
                    });
                }
            }
            Side::Return => {
                for consumer in &network.consumers {
                    injections[consumer.return_junction.index()].push(Inflow {
                        mass_flow: consumer.mass_flow,
                        temperature: consumer.outlet_temperature,
                    });
                }
            }
        }

        for layer in 1..=layers.max_layer() {
            let ids = layers.pipes_in_layer(layer);
            let net: &HydraulicNetwork = network;
            let compute = |id: PipeId| -> (PipeId, Result<PipeUpdate, ThermalError>) {
                let pipe = net.pipe(id);
                let t_in = net.junction(pipe.inlet()).temperature;
                (id, advance_pipe(pipe, t_in, ground[id.index()], dt, &fluid, &tol))
            };
            let updates: Vec<_> = if parallel && ids.len() >= threshold {
                ids.par_iter().map(|&id| compute(id)).collect()
            } else {
                ids.iter().map(|&id| compute(id)).collect()
            };

            for (id, result) in updates {
                match result {
                    Ok(update) => {
                        if update.fell_back {
                            self.stats.thermal_fallbacks += 1;
                        }
                        update.apply(network.pipe_mut(id));
                    }
                    Err(e) => {
                        return Err(SimError::Numerical {
                            pipe: network.pipe(id).name.clone(),
                            step,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            let mut fed: Vec<JunctionId> = ids.iter().map(|&id| network.pipe(id).outlet()).collect();
            fed.sort();
            fed.dedup();
            for j in fed {
                let mut inflows: Vec<Inflow> = incoming[j.index()]
                    .iter()
                    .filter(|&&id| {
                        let l = layers.layer(id);
                        l != 0 && l <= layer
                    })
                    .map(|&id| {
                        let pipe = network.pipe(id);
                        Inflow {
                            mass_flow: pipe.flow_along(),
                            temperature: pipe.outlet_temperature,
                        }
                    })
                    .collect();
                inflows.extend_from_slice(&injections[j.index()]);
                let current = network.junction(j).temperature;
                network.junction_mut(j).temperature = mix(current, &inflows).temperature;
            }
        }
        Ok(())
    }

    /// Extract each consumer's demand between its supply and return junction.
    pub fn balance_consumers(&mut self) {
        let cp = self.ctx.fluid.cp();
        let min_mass_flow = self.ctx.tolerances.min_mass_flow;
        let network = &mut self.network;
        for consumer in network.consumers.iter_mut() {
            let t_in = network.junctions[consumer.supply_junction.index()].temperature;
            let t_out = outlet_temperature(t_in, consumer.demand, consumer.mass_flow, cp, min_mass_flow);
            consumer.outlet_temperature = t_out;
            network.junctions[consumer.return_junction.index()].temperature = t_out;
        }
    }
}

fn attempt<S: HydraulicSolver>(
    solver: &mut S,
    network: &HydraulicNetwork,
    settings: &SolverSettings,
) -> SolverResult<HydraulicSolution> {
    let solution = solver.solve(network, settings)?;
    solution.check_shape(network)?;
    Ok(solution)
}

fn apply_solution(network: &mut HydraulicNetwork, solution: &HydraulicSolution, density: f64) {
    for (j, p) in network.junctions.iter_mut().zip(&solution.junction_pressures) {
        j.pressure = *p;
    }
    for (pipe, flow) in network.pipes.iter_mut().zip(&solution.pipe_flows) {
        pipe.set_flow(flow.mass_flow, flow.p_from, flow.p_to, density);
    }
    for (c, m) in network.consumers.iter_mut().zip(&solution.consumer_flows) {
        c.mass_flow = *m;
    }
    for (p, m) in network.pumps.iter_mut().zip(&solution.pump_flows) {
        p.mass_flow = *m;
    }
}

fn check_fluid(fluid: &FluidProperties) -> SimResult<()> {
    let wrap = |e: HnError| SimError::config("fluid", e.to_string());
    ensure_positive(fluid.rho(), "density").map_err(wrap)?;
    ensure_positive(fluid.cp(), "specific heat").map_err(wrap)?;
    ensure_positive(fluid.mu(), "viscosity").map_err(wrap)?;
    Ok(())
}

fn check_demand_coverage(network: &HydraulicNetwork, ctx: &SimulationContext) -> SimResult<()> {
    let samples = ctx.config.samples();
    for c in &network.consumers {
        if c.heat.len() < samples {
            return Err(SimError::config(
                format!("demand {}", c.name),
                format!("heat series has {} samples, run needs {samples}", c.heat.len()),
            ));
        }
        if ctx.config.demand_mode == DemandMode::HeatingAndDhw
            && !c.dhw.is_empty()
            && c.dhw.len() < samples
        {
            return Err(SimError::config(
                format!("demand {}", c.name),
                format!("hot water series has {} samples, run needs {samples}", c.dhw.len()),
            ));
        }
    }
    Ok(())
}
