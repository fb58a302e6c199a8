//! Core graph data structures.

use hn_core::units::{
    Length, MassRate, Pressure, TempInterval, Temperature, ThermalConductivity, m,
};
use petgraph::Undirected;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::results::{EdgeResults, NodeResults};

/// Planar position of a node (projected coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Hydraulic targets of a supply (plant) building.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyAttrs {
    /// Absolute pressure at the plant outlet into the supply line.
    pub p_flow: Pressure,
    /// Absolute pressure at the plant inlet from the return line.
    pub p_return: Pressure,
    /// Supply (flow) temperature.
    pub t_flow: Temperature,
    /// Nominal return temperature, used to initialise the return side.
    pub t_return: Temperature,
    /// Fixed feed-in for secondary plants. The pressure reference ignores it.
    pub mass_flow: Option<MassRate>,
}

impl SupplyAttrs {
    pub fn pressure_reference(
        p_flow: Pressure,
        p_return: Pressure,
        t_flow: Temperature,
        t_return: Temperature,
    ) -> Self {
        Self {
            p_flow,
            p_return,
            t_flow,
            t_return,
            mass_flow: None,
        }
    }

    /// Pressure lift across the plant.
    pub fn pressure_lift(&self) -> Pressure {
        self.p_flow - self.p_return
    }
}

/// Demand of a consumer building.
///
/// Series are indexed by sample (one value per demand interval, W).
#[derive(Debug, Clone, PartialEq)]
pub struct DemandAttrs {
    pub design_delta_t: TempInterval,
    pub heat: Vec<f64>,
    pub dhw: Vec<f64>,
    /// Cooling demand, W. Kept so projects round-trip; the simulation does
    /// not use it.
    pub cooling: Vec<f64>,
}

impl DemandAttrs {
    pub fn heating(design_delta_t: TempInterval, heat: Vec<f64>) -> Self {
        Self {
            design_delta_t,
            heat,
            dhw: Vec::new(),
            cooling: Vec::new(),
        }
    }

    pub fn with_dhw(mut self, dhw: Vec<f64>) -> Self {
        self.dhw = dhw;
        self
    }

    pub fn with_cooling(mut self, cooling: Vec<f64>) -> Self {
        self.cooling = cooling;
        self
    }
}

/// Role of a node in the district network.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    Supply(SupplyAttrs),
    Demand(DemandAttrs),
    Junction,
}

impl NodeRole {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeRole::Supply(_) => "supply",
            NodeRole::Demand(_) => "demand",
            NodeRole::Junction => "junction",
        }
    }
}

/// A building or street junction.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub name: String,
    pub position: Position,
    pub role: NodeRole,
    /// Simulated series written back after a run.
    pub results: NodeResults,
}

impl GraphNode {
    pub fn is_supply(&self) -> bool {
        matches!(self.role, NodeRole::Supply(_))
    }

    pub fn is_demand(&self) -> bool {
        matches!(self.role, NodeRole::Demand(_))
    }
}

/// Physical pipe attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeAttrs {
    /// Stable pipe id, unique within the network.
    pub pipe_id: String,
    pub length: Length,
    pub inner_diameter: Length,
    /// Absolute wall roughness.
    pub roughness: Length,
    pub insulation_thickness: Length,
    pub insulation_conductivity: ThermalConductivity,
    /// Number of control volumes along the pipe.
    pub sections: u32,
    /// Burial depth, selects the ground temperature series.
    pub ground_depth: Length,
    /// Sum of minor loss coefficients. Estimated from the length when absent.
    pub minor_loss: Option<f64>,
}

impl PipeAttrs {
    pub fn new(
        pipe_id: impl Into<String>,
        length: Length,
        inner_diameter: Length,
        roughness: Length,
        insulation_thickness: Length,
        insulation_conductivity: ThermalConductivity,
        sections: u32,
    ) -> Self {
        Self {
            pipe_id: pipe_id.into(),
            length,
            inner_diameter,
            roughness,
            insulation_thickness,
            insulation_conductivity,
            sections,
            ground_depth: m(1.0),
            minor_loss: None,
        }
    }

    pub fn with_ground_depth(mut self, depth: Length) -> Self {
        self.ground_depth = depth;
        self
    }

    pub fn with_minor_loss(mut self, xi: f64) -> Self {
        self.minor_loss = Some(xi);
        self
    }
}

/// A pipe between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub attrs: PipeAttrs,
    /// Simulated series written back after a run.
    pub results: EdgeResults,
}

/// The validated physical network: an undirected graph of buildings and
/// junctions connected by pipes.
///
/// Node and edge indices are stable for the lifetime of the graph (no removals
/// are exposed), which lets the hydraulic network keep them in its id maps.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    pub(crate) name: String,
    pub(crate) graph: Graph<GraphNode, GraphEdge, Undirected>,
}

impl NetworkGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get a node by index (None if out of bounds).
    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut GraphNode> {
        self.graph.node_weight_mut(idx)
    }

    /// Get an edge by index (None if out of bounds).
    pub fn edge(&self, idx: EdgeIndex) -> Option<&GraphEdge> {
        self.graph.edge_weight(idx)
    }

    pub fn edge_mut(&mut self, idx: EdgeIndex) -> Option<&mut GraphEdge> {
        self.graph.edge_weight_mut(idx)
    }

    /// Endpoints in the order the pipe was added.
    pub fn endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// Pipes incident to `node`, paired with the node at their other end.
    pub fn incident(&self, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut out: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                if a == node {
                    Some((e, b))
                } else if b == node {
                    Some((e, a))
                } else {
                    None
                }
            })
            .collect();
        out.sort_by_key(|(e, _)| e.index());
        out
    }

    /// Supply nodes in insertion order. The first one is the pressure reference.
    pub fn supplies(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(|&n| self.graph[n].is_supply())
    }

    pub fn demands(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(|&n| self.graph[n].is_demand())
    }

    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&n| self.graph[n].name == name)
    }

    pub fn find_pipe(&self, pipe_id: &str) -> Option<EdgeIndex> {
        self.graph
            .edge_indices()
            .find(|&e| self.graph[e].attrs.pipe_id == pipe_id)
    }

    /// Total pipe length in meters.
    pub fn total_length(&self) -> f64 {
        self.graph
            .edge_weights()
            .map(|e| e.attrs.length.value)
            .sum()
    }

    /// Underlying petgraph graph, for traversal algorithms.
    pub fn inner(&self) -> &Graph<GraphNode, GraphEdge, Undirected> {
        &self.graph
    }
}
