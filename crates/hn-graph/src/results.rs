//! Result slots on graph nodes and edges.
//!
//! After a run the simulation copies its time series onto the graph so that
//! callers can inspect results by building or pipe instead of by arena index.

/// Time series of one junction (one value per recorded timestep).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JunctionSeries {
    /// Pressure in Pa.
    pub pressure: Vec<f64>,
    /// Temperature in K.
    pub temperature: Vec<f64>,
}

/// Time series of one directed pipe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipeSeries {
    /// Mass flow in kg/s, signed relative to the pipe's nominal orientation.
    pub mass_flow: Vec<f64>,
    /// Mean velocity in m/s (signed like the mass flow).
    pub velocity: Vec<f64>,
    /// Outlet temperature in K (at the downstream end of the current flow).
    pub outlet_temperature: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeResults {
    pub supply: JunctionSeries,
    pub ret: JunctionSeries,
}

impl NodeResults {
    pub fn is_empty(&self) -> bool {
        self.supply.pressure.is_empty() && self.ret.pressure.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeResults {
    pub supply: PipeSeries,
    pub ret: PipeSeries,
}

impl EdgeResults {
    pub fn is_empty(&self) -> bool {
        self.supply.mass_flow.is_empty() && self.ret.mass_flow.is_empty()
    }
}
