//! Thermo-hydraulic transient simulation of district heating networks.
//!
//! Provides:
//! - Layer resolution: flow-dependent order in which pipes are advanced
//! - Implicit upwind advection/heat-loss update per pipe
//! - Junction mixing and consumer heat extraction
//! - The timestep driver tying hydraulics and thermal transport together
//! - Write-back of recorded series onto the network graph

pub mod config;
pub mod consumer;
pub mod context;
pub mod driver;
pub mod error;
pub mod ground;
pub mod layers;
pub mod mixer;
pub mod snapshot;
pub mod thermal;
pub mod writeback;

pub use config::SimulationConfig;
pub use consumer::{DemandMode, demand_at, outlet_temperature};
pub use context::SimulationContext;
pub use driver::{SimProgress, SimStats, Simulation, Stage};
pub use error::{SimError, SimResult, ThermalError, TopologyError};
pub use ground::{DepthSeries, GroundProfile};
pub use layers::{Direction, LayerMap, UNREACHED, needs_reorientation, resolve_layers};
pub use mixer::{Inflow, MixOutcome, mix};
pub use thermal::{PipeStep, PipeThermal, PipeUpdate, advance, advance_pipe};
pub use writeback::{NetworkMaps, write_back};
