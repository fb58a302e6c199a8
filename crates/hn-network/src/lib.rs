//! hn-network: dual-line hydraulic network assembled from the physical graph.
//!
//! Every building or junction of the physical graph becomes two hydraulic
//! junctions (one per side) and every physical pipe becomes a supply pipe and
//! a return pipe. Supply buildings get a pump, demand buildings a heat
//! consumer. The id maps returned by [`assemble`] are the only link back to
//! the graph.

pub mod assemble;
pub mod catalog;
pub mod error;
pub mod maps;
pub mod model;

pub use assemble::{AssembleOptions, assemble};
pub use catalog::{CatalogEntry, estimate_minor_loss, snap_to_catalog};
pub use error::{NetworkError, NetworkResult};
pub use maps::{JunctionMap, PipeMap};
pub use model::{HeatConsumer, HydraulicNetwork, Junction, Pipe, Pump, PumpMode, Side};
