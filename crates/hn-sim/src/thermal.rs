//! Implicit upwind update of a pipe's temperature profile.
//!
//! Per control volume `i` of length `dx`:
//!
//! ```text
//! (1 + dt (F_conv + F_loss)) T_i - dt F_conv T_{i-1} = T_i_prev + dt F_loss T_ground
//! F_conv = 4 m / (rho pi d^2 dx)
//! F_loss = 4 alpha / (rho d cp)
//! ```
//!
//! with `T_0` fixed to the inlet temperature. The system is lower bidiagonal
//! and is solved exactly by one forward sweep, which keeps the scheme
//! unconditionally stable for any timestep.

use std::f64::consts::PI;

use hn_core::{FluidProperties, Tolerances};
use hn_network::Pipe;
use tracing::warn;

use crate::error::ThermalError;

/// Fixed thermal properties of a pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeThermal {
    /// m
    pub length: f64,
    /// m
    pub inner_diameter: f64,
    /// W/(m2 K)
    pub alpha: f64,
    /// kg/m3
    pub density: f64,
    /// J/(kg K)
    pub cp: f64,
}

impl PipeThermal {
    pub fn of(pipe: &Pipe, fluid: &FluidProperties) -> Self {
        Self {
            length: pipe.length.value,
            inner_diameter: pipe.inner_diameter.value,
            alpha: pipe.alpha,
            density: fluid.rho(),
            cp: fluid.cp(),
        }
    }

    /// Convection and loss coefficients (1/s) for `sections` control volumes.
    pub fn coefficients(&self, mass_flow: f64, sections: usize) -> (f64, f64) {
        let dx = self.length / sections as f64;
        let f_conv = 4.0 * mass_flow / (self.density * PI * self.inner_diameter.powi(2) * dx);
        let f_loss = 4.0 * self.alpha / (self.density * self.inner_diameter * self.cp);
        (f_conv, f_loss)
    }
}

/// Boundary values of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeStep {
    /// Inlet temperature, K.
    pub t_in: f64,
    /// Mass flow magnitude along the flow direction, kg/s.
    pub mass_flow: f64,
    /// K
    pub t_ground: f64,
    /// s
    pub dt: f64,
}

/// Advance a profile given in flow coordinates (index 0 at the inlet).
///
/// Flows at or below `min_mass_flow` skip convection, leaving pure
/// conduction to the ground.
pub fn advance(
    previous: &[f64],
    step: &PipeStep,
    pipe: &PipeThermal,
    min_mass_flow: f64,
) -> Result<Vec<f64>, ThermalError> {
    if previous.len() < 2 {
        return Err(ThermalError::InvalidInput {
            what: "profile needs at least one section",
        });
    }
    let sections = previous.len() - 1;
    let m = step.mass_flow.abs();
    let (f_conv, f_loss) = if m <= min_mass_flow {
        (0.0, pipe.coefficients(0.0, sections).1)
    } else {
        pipe.coefficients(m, sections)
    };
    finite(f_conv, "convection coefficient")?;
    finite(f_loss, "loss coefficient")?;
    finite(step.t_in, "inlet temperature")?;
    finite(step.t_ground, "ground temperature")?;

    let dt = step.dt;
    let diag = 1.0 + dt * (f_conv + f_loss);
    let mut next = Vec::with_capacity(previous.len());
    next.push(step.t_in);
    for i in 1..=sections {
        let rhs = previous[i] + dt * f_loss * step.t_ground + dt * f_conv * next[i - 1];
        let t = finite(rhs / diag, "profile temperature")?;
        next.push(t);
    }
    Ok(next)
}

fn finite(value: f64, what: &'static str) -> Result<f64, ThermalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ThermalError::NonFinite { what, value })
    }
}

/// New state of one pipe, ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeUpdate {
    /// Profile in physical orientation (index 0 at `pipe.from`).
    pub profile: Vec<f64>,
    pub outlet_temperature: f64,
    /// The pure conduction fallback was used.
    pub fell_back: bool,
}

impl PipeUpdate {
    pub fn apply(self, pipe: &mut Pipe) {
        pipe.profile_mut().copy_from_slice(&self.profile);
        pipe.outlet_temperature = self.outlet_temperature;
    }
}

/// Advance `pipe` by `dt` with inlet temperature `t_in`.
///
/// The stored profile is read and written in flow coordinates, so a reversed
/// pipe is integrated from its `to` end. On a numerical failure the update is
/// repeated without convection; only if that fails too is an error returned.
pub fn advance_pipe(
    pipe: &Pipe,
    t_in: f64,
    t_ground: f64,
    dt: f64,
    fluid: &FluidProperties,
    tol: &Tolerances,
) -> Result<PipeUpdate, ThermalError> {
    let thermal = PipeThermal::of(pipe, fluid);
    let mut flow_profile = pipe.profile().to_vec();
    if pipe.flow_reversed {
        flow_profile.reverse();
    }
    let mut step = PipeStep {
        t_in,
        mass_flow: pipe.flow_along(),
        t_ground,
        dt,
    };

    let first = advance(&flow_profile, &step, &thermal, tol.min_mass_flow);
    let (mut next, fell_back) = match first {
        Ok(next) => (next, false),
        Err(err) => {
            warn!(pipe = %pipe.name, error = %err, "falling back to pure conduction");
            step.mass_flow = 0.0;
            (advance(&flow_profile, &step, &thermal, tol.min_mass_flow)?, true)
        }
    };

    let outlet_temperature = next[next.len() - 1];
    if pipe.flow_reversed {
        next.reverse();
    }
    Ok(PipeUpdate {
        profile: next,
        outlet_temperature,
        fell_back,
    })
}
