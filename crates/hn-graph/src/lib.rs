//! hn-graph: physical network graph for heatnet.
//!
//! Provides:
//! - Typed node roles (supply, demand, junction) and pipe edges
//! - Incremental graph builder with validation
//! - Result slots used to write simulated time series back onto the graph
//!
//! # Example
//!
//! ```
//! use hn_core::units::{bar, dk, k, m, mm, w_per_m_k};
//! use hn_graph::{DemandAttrs, GraphBuilder, PipeAttrs, Position, SupplyAttrs};
//!
//! let mut builder = GraphBuilder::new("demo");
//! let plant = builder
//!     .add_supply("plant", Position::new(0.0, 0.0), SupplyAttrs::pressure_reference(
//!         bar(5.0), bar(2.0), k(353.15), k(323.15),
//!     ))
//!     .unwrap();
//! let house = builder
//!     .add_demand("house", Position::new(100.0, 0.0), DemandAttrs::heating(dk(30.0), vec![10_000.0]))
//!     .unwrap();
//! builder
//!     .add_pipe(plant, house, PipeAttrs::new("p1", m(100.0), mm(100.0), mm(0.025), mm(38.0), w_per_m_k(0.035), 5))
//!     .unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod results;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{
    DemandAttrs, GraphEdge, GraphNode, NetworkGraph, NodeRole, PipeAttrs, Position, SupplyAttrs,
};
pub use petgraph::graph::{EdgeIndex, NodeIndex};
pub use results::{EdgeResults, JunctionSeries, NodeResults, PipeSeries};
