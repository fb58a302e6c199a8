//! Explicit run context passed instead of global state.

use hn_core::{FluidProperties, Tolerances};
use tracing::Span;

use crate::config::SimulationConfig;

/// Everything a run needs besides the network itself.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub config: SimulationConfig,
    pub tolerances: Tolerances,
    pub fluid: FluidProperties,
    /// Parent span of all events emitted by the run.
    pub span: Span,
}

impl SimulationContext {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            tolerances: Tolerances::default(),
            fluid: FluidProperties::default(),
            span: Span::none(),
        }
    }

    pub fn with_fluid(mut self, fluid: FluidProperties) -> Self {
        self.fluid = fluid;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Attach a `simulation` span named after the network.
    pub fn with_span_for(mut self, network: &str) -> Self {
        self.span = tracing::info_span!("simulation", network = %network);
        self
    }
}
