//! Hydraulic network arena.
//!
//! Geometry is carried in `uom` quantities. Per-step state (pressures,
//! temperatures, flows) is plain `f64` in SI base units (Pa, K, kg/s) since it
//! is rewritten thousands of times per run.

use std::f64::consts::PI;

use hn_core::units::{Length, TempInterval};
use hn_core::{ConsumerId, JunctionId, PipeId, PumpId, Tolerances};

/// Which of the two parallel lines a component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Supply,
    Return,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Supply => "supply",
            Side::Return => "return",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A hydraulic node on one side of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub name: String,
    pub side: Side,
    /// Pa
    pub pressure: f64,
    /// K
    pub temperature: f64,
}

/// A directed pipe with a discretized temperature profile.
///
/// `from`/`to` are the nominal orientation. The profile is stored in that
/// orientation too: index 0 sits at `from`. When the hydraulic solution
/// reports flow against the nominal direction, `flow_reversed` is set and the
/// logical inlet becomes `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub name: String,
    pub side: Side,
    pub from: JunctionId,
    pub to: JunctionId,
    pub length: Length,
    pub inner_diameter: Length,
    pub roughness: Length,
    pub ground_depth: Length,
    /// Sum of minor loss coefficients.
    pub minor_loss: f64,
    /// Heat transfer coefficient of the insulation, W/(m2 K).
    pub alpha: f64,
    profile: Vec<f64>,
    pub flow_reversed: bool,
    /// kg/s, signed relative to `from -> to`.
    pub mass_flow: f64,
    /// m/s, signed like `mass_flow`.
    pub velocity: f64,
    /// Pa at `from`.
    pub p_from: f64,
    /// Pa at `to`.
    pub p_to: f64,
    /// K at the logical outlet.
    pub outlet_temperature: f64,
}

impl Pipe {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        side: Side,
        from: JunctionId,
        to: JunctionId,
        length: Length,
        inner_diameter: Length,
        roughness: Length,
        ground_depth: Length,
        minor_loss: f64,
        alpha: f64,
        sections: usize,
        initial_temperature: f64,
    ) -> Self {
        Self {
            name: name.into(),
            side,
            from,
            to,
            length,
            inner_diameter,
            roughness,
            ground_depth,
            minor_loss,
            alpha,
            profile: vec![initial_temperature; sections + 1],
            flow_reversed: false,
            mass_flow: 0.0,
            velocity: 0.0,
            p_from: 0.0,
            p_to: 0.0,
            outlet_temperature: initial_temperature,
        }
    }

    /// Number of control volumes (profile length minus one).
    pub fn sections(&self) -> usize {
        self.profile.len() - 1
    }

    /// Temperature profile in physical orientation (index 0 at `from`).
    pub fn profile(&self) -> &[f64] {
        &self.profile
    }

    /// Mutable view of the profile. A slice cannot change length, so the
    /// profile size stays fixed for the lifetime of the pipe.
    pub fn profile_mut(&mut self) -> &mut [f64] {
        &mut self.profile
    }

    pub fn fill_profile(&mut self, temperature: f64) {
        self.profile.fill(temperature);
        self.outlet_temperature = temperature;
    }

    /// Junction the fluid currently enters from.
    pub fn inlet(&self) -> JunctionId {
        if self.flow_reversed { self.to } else { self.from }
    }

    /// Junction the fluid currently leaves into.
    pub fn outlet(&self) -> JunctionId {
        if self.flow_reversed { self.from } else { self.to }
    }

    /// Mass flow magnitude along the logical direction, kg/s.
    pub fn flow_along(&self) -> f64 {
        self.mass_flow.abs()
    }

    /// Whether the stored orientation disagrees with the sign of `mass_flow`.
    pub fn orientation_stale(&self, tol: &Tolerances) -> bool {
        (self.mass_flow < -tol.min_mass_flow && !self.flow_reversed)
            || (self.mass_flow > tol.min_mass_flow && self.flow_reversed)
    }

    /// Apply the sign of `mass_flow` to `flow_reversed`; flows inside the
    /// dead band keep the previous orientation. Returns true if it flipped.
    pub fn orient_by_flow(&mut self, tol: &Tolerances) -> bool {
        let before = self.flow_reversed;
        if self.mass_flow < -tol.min_mass_flow {
            self.flow_reversed = true;
        } else if self.mass_flow > tol.min_mass_flow {
            self.flow_reversed = false;
        }
        before != self.flow_reversed
    }

    /// Cross-section area in m2.
    pub fn area(&self) -> f64 {
        PI * self.inner_diameter.value.powi(2) / 4.0
    }

    /// Store a hydraulic result and derive the velocity.
    pub fn set_flow(&mut self, mass_flow: f64, p_from: f64, p_to: f64, density: f64) {
        self.mass_flow = mass_flow;
        self.p_from = p_from;
        self.p_to = p_to;
        self.velocity = mass_flow / (density * self.area());
    }
}

/// How a plant participates in the hydraulic solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpMode {
    /// Fixes the pressures of both of its junctions (Pa).
    PressureReference { p_flow: f64, p_return: f64 },
    /// Injects a fixed mass flow (kg/s) into the supply line and draws the
    /// same amount from the return line.
    FixedMassFlow { mass_flow: f64 },
}

/// A plant: draws from `return_junction`, lifts and heats, feeds
/// `supply_junction`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pump {
    pub name: String,
    pub supply_junction: JunctionId,
    pub return_junction: JunctionId,
    pub mode: PumpMode,
    /// Supply temperature setpoint, K.
    pub t_flow: f64,
    /// kg/s delivered into the supply line (from the last hydraulic solve).
    pub mass_flow: f64,
    /// Measured return temperature, K.
    pub return_temperature: f64,
}

impl Pump {
    pub fn is_reference(&self) -> bool {
        matches!(self.mode, PumpMode::PressureReference { .. })
    }

    /// Heat added by the plant, W.
    pub fn heat_flow(&self, cp: f64) -> f64 {
        self.mass_flow * cp * (self.t_flow - self.return_temperature)
    }
}

/// A building substation between the supply and return line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatConsumer {
    pub name: String,
    pub supply_junction: JunctionId,
    pub return_junction: JunctionId,
    pub design_delta_t: TempInterval,
    /// Space heating demand per sample, W.
    pub heat: Vec<f64>,
    /// Domestic hot water demand per sample, W.
    pub dhw: Vec<f64>,
    /// Demand of the current sample, W.
    pub demand: f64,
    /// Mass flow setpoint (and result), kg/s.
    pub mass_flow: f64,
    /// K
    pub outlet_temperature: f64,
}

impl HeatConsumer {
    /// Mass flow needed to deliver `demand` at the design temperature drop.
    pub fn setpoint(&self, cp: f64) -> f64 {
        if self.demand <= 0.0 {
            return 0.0;
        }
        self.demand / (cp * self.design_delta_t.value)
    }
}

/// Arena of all hydraulic components. Ids index straight into the vectors.
#[derive(Debug, Clone, Default)]
pub struct HydraulicNetwork {
    pub name: String,
    pub junctions: Vec<Junction>,
    pub pipes: Vec<Pipe>,
    pub pumps: Vec<Pump>,
    pub consumers: Vec<HeatConsumer>,
}

impl HydraulicNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_junction(
        &mut self,
        name: impl Into<String>,
        side: Side,
        temperature: f64,
    ) -> JunctionId {
        let id = JunctionId::from_index(self.junctions.len());
        self.junctions.push(Junction {
            name: name.into(),
            side,
            pressure: 0.0,
            temperature,
        });
        id
    }

    pub fn add_pipe(&mut self, pipe: Pipe) -> PipeId {
        let id = PipeId::from_index(self.pipes.len());
        self.pipes.push(pipe);
        id
    }

    pub fn add_pump(&mut self, pump: Pump) -> PumpId {
        let id = PumpId::from_index(self.pumps.len());
        self.pumps.push(pump);
        id
    }

    pub fn add_consumer(&mut self, consumer: HeatConsumer) -> ConsumerId {
        let id = ConsumerId::from_index(self.consumers.len());
        self.consumers.push(consumer);
        id
    }

    pub fn junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.index()]
    }

    pub fn junction_mut(&mut self, id: JunctionId) -> &mut Junction {
        &mut self.junctions[id.index()]
    }

    pub fn pipe(&self, id: PipeId) -> &Pipe {
        &self.pipes[id.index()]
    }

    pub fn pipe_mut(&mut self, id: PipeId) -> &mut Pipe {
        &mut self.pipes[id.index()]
    }

    pub fn pump(&self, id: PumpId) -> &Pump {
        &self.pumps[id.index()]
    }

    pub fn consumer(&self, id: ConsumerId) -> &HeatConsumer {
        &self.consumers[id.index()]
    }

    /// Ids of the pipes on one side, in arena order.
    pub fn pipes_on(&self, side: Side) -> Vec<PipeId> {
        self.pipes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.side == side)
            .map(|(i, _)| PipeId::from_index(i))
            .collect()
    }

    /// The plant fixing the pressure level, if any.
    pub fn reference_pump(&self) -> Option<PumpId> {
        self.pumps
            .iter()
            .position(Pump::is_reference)
            .map(PumpId::from_index)
    }

    /// Junctions acting as the boundary of one side: pump outlets on the
    /// supply side, pump inlets on the return side.
    pub fn boundary_junctions(&self, side: Side) -> Vec<JunctionId> {
        self.pumps
            .iter()
            .map(|p| match side {
                Side::Supply => p.supply_junction,
                Side::Return => p.return_junction,
            })
            .collect()
    }

    pub fn set_uniform_temperature(&mut self, side: Side, temperature: f64) {
        for j in self.junctions.iter_mut().filter(|j| j.side == side) {
            j.temperature = temperature;
        }
        for p in self.pipes.iter_mut().filter(|p| p.side == side) {
            p.fill_profile(temperature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{m, mm};

    fn pipe(sections: usize) -> Pipe {
        Pipe::new(
            "p",
            Side::Supply,
            JunctionId::from_index(0),
            JunctionId::from_index(1),
            m(100.0),
            mm(100.0),
            mm(0.025),
            m(1.0),
            0.5,
            0.9,
            sections,
            330.0,
        )
    }

    #[test]
    fn profile_has_sections_plus_one_samples() {
        let p = pipe(5);
        assert_eq!(p.profile().len(), 6);
        assert_eq!(p.sections(), 5);
    }

    #[test]
    fn reversal_swaps_inlet_and_outlet() {
        let mut p = pipe(2);
        let tol = Tolerances::default();
        assert_eq!(p.inlet(), JunctionId::from_index(0));

        p.mass_flow = -0.3;
        assert!(p.orientation_stale(&tol));
        assert!(p.orient_by_flow(&tol));
        assert_eq!(p.inlet(), JunctionId::from_index(1));
        assert_eq!(p.outlet(), JunctionId::from_index(0));

        // Inside the dead band the previous orientation is kept.
        p.mass_flow = 0.0;
        assert!(!p.orient_by_flow(&tol));
        assert!(p.flow_reversed);
    }

    #[test]
    fn velocity_follows_flow_sign() {
        let mut p = pipe(1);
        p.set_flow(-1.0, 2.0e5, 2.1e5, 1000.0);
        assert!(p.velocity < 0.0);
        let expected = 1.0 / (1000.0 * p.area());
        assert!((p.velocity.abs() - expected).abs() < 1e-12);
    }

    #[test]
    fn consumer_setpoint() {
        let c = HeatConsumer {
            name: "h".into(),
            supply_junction: JunctionId::from_index(0),
            return_junction: JunctionId::from_index(1),
            design_delta_t: hn_core::units::dk(20.0),
            heat: vec![],
            dhw: vec![],
            demand: 41_800.0,
            mass_flow: 0.0,
            outlet_temperature: 0.0,
        };
        assert!((c.setpoint(4180.0) - 0.5).abs() < 1e-12);
    }
}
