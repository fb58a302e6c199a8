//! Incremental graph builder.

use petgraph::Undirected;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::error::{GraphError, GraphResult};
use crate::graph::{
    DemandAttrs, GraphEdge, GraphNode, NetworkGraph, NodeRole, PipeAttrs, Position, SupplyAttrs,
};
use crate::results::{EdgeResults, NodeResults};
use crate::validate;

/// Builder for constructing a network graph incrementally.
///
/// Use the `add_*` methods to build up the graph, then call `build()` to
/// validate and freeze it into a `NetworkGraph`.
#[derive(Debug)]
pub struct GraphBuilder {
    name: String,
    graph: Graph<GraphNode, GraphEdge, Undirected>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: Graph::new_undirected(),
        }
    }

    /// Add a supply (plant) building.
    pub fn add_supply(
        &mut self,
        name: impl Into<String>,
        position: Position,
        attrs: SupplyAttrs,
    ) -> GraphResult<NodeIndex> {
        self.add_node(name.into(), position, NodeRole::Supply(attrs))
    }

    /// Add a demand (consumer) building.
    pub fn add_demand(
        &mut self,
        name: impl Into<String>,
        position: Position,
        attrs: DemandAttrs,
    ) -> GraphResult<NodeIndex> {
        self.add_node(name.into(), position, NodeRole::Demand(attrs))
    }

    /// Add a street junction.
    pub fn add_junction(
        &mut self,
        name: impl Into<String>,
        position: Position,
    ) -> GraphResult<NodeIndex> {
        self.add_node(name.into(), position, NodeRole::Junction)
    }

    fn add_node(
        &mut self,
        name: String,
        position: Position,
        role: NodeRole,
    ) -> GraphResult<NodeIndex> {
        if self.graph.node_weights().any(|n| n.name == name) {
            return Err(GraphError::DuplicateNode { name });
        }
        Ok(self.graph.add_node(GraphNode {
            name,
            position,
            role,
            results: NodeResults::default(),
        }))
    }

    /// Connect two nodes with a pipe.
    pub fn add_pipe(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        attrs: PipeAttrs,
    ) -> GraphResult<EdgeIndex> {
        for idx in [from, to] {
            if idx.index() >= self.graph.node_count() {
                return Err(GraphError::InvalidNodeRef {
                    pipe_id: attrs.pipe_id,
                    index: idx.index(),
                });
            }
        }
        if from == to {
            return Err(GraphError::SelfLoop {
                pipe_id: attrs.pipe_id,
                node: self.graph[from].name.clone(),
            });
        }
        if self
            .graph
            .edge_weights()
            .any(|e| e.attrs.pipe_id == attrs.pipe_id)
        {
            return Err(GraphError::DuplicatePipe {
                pipe_id: attrs.pipe_id,
            });
        }
        Ok(self.graph.add_edge(
            from,
            to,
            GraphEdge {
                attrs,
                results: EdgeResults::default(),
            },
        ))
    }

    /// Rename a node (useful for post-construction adjustments).
    pub fn rename_node(&mut self, node: NodeIndex, new_name: impl Into<String>) -> GraphResult<()> {
        let new_name = new_name.into();
        if self
            .graph
            .node_indices()
            .any(|n| n != node && self.graph[n].name == new_name)
        {
            return Err(GraphError::DuplicateNode { name: new_name });
        }
        if let Some(weight) = self.graph.node_weight_mut(node) {
            weight.name = new_name;
        }
        Ok(())
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> GraphResult<NetworkGraph> {
        validate::validate_structure(&self.name, &self.graph)?;
        Ok(NetworkGraph {
            name: self.name,
            graph: self.graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{m, mm, w_per_m_k};

    fn pipe(id: &str) -> PipeAttrs {
        PipeAttrs::new(
            id,
            m(50.0),
            mm(80.0),
            mm(0.025),
            mm(40.0),
            w_per_m_k(0.035),
            4,
        )
    }

    #[test]
    fn builder_basic() {
        let mut builder = GraphBuilder::new("b");
        let n1 = builder.add_junction("J1", Position::default()).unwrap();
        let n2 = builder.add_junction("J2", Position::new(50.0, 0.0)).unwrap();
        let e1 = builder.add_pipe(n1, n2, pipe("p1")).unwrap();

        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        assert_eq!(e1.index(), 0);

        let graph = builder.build().unwrap();
        assert_eq!(graph.endpoints(e1), Some((n1, n2)));
        assert_eq!(graph.incident(n2), vec![(e1, n1)]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut builder = GraphBuilder::new("b");
        builder.add_junction("J1", Position::default()).unwrap();
        let err = builder.add_junction("J1", Position::default()).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode { name: "J1".into() });
    }

    #[test]
    fn self_loop_rejected() {
        let mut builder = GraphBuilder::new("b");
        let n1 = builder.add_junction("J1", Position::default()).unwrap();
        let err = builder.add_pipe(n1, n1, pipe("p1")).unwrap_err();
        assert!(matches!(err, GraphError::SelfLoop { .. }));
    }

    #[test]
    fn duplicate_pipe_ids_rejected() {
        let mut builder = GraphBuilder::new("b");
        let n1 = builder.add_junction("J1", Position::default()).unwrap();
        let n2 = builder.add_junction("J2", Position::default()).unwrap();
        let n3 = builder.add_junction("J3", Position::default()).unwrap();
        builder.add_pipe(n1, n2, pipe("p1")).unwrap();
        let err = builder.add_pipe(n2, n3, pipe("p1")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicatePipe { .. }));
    }

    #[test]
    fn unknown_node_rejected() {
        let mut builder = GraphBuilder::new("b");
        let n1 = builder.add_junction("J1", Position::default()).unwrap();
        let err = builder
            .add_pipe(n1, NodeIndex::new(9), pipe("p1"))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidNodeRef { index: 9, .. }));
    }

    #[test]
    fn rename_node_checks_uniqueness() {
        let mut builder = GraphBuilder::new("b");
        let n1 = builder.add_junction("Old", Position::default()).unwrap();
        builder.add_junction("Taken", Position::default()).unwrap();
        assert!(builder.rename_node(n1, "Taken").is_err());
        builder.rename_node(n1, "New").unwrap();
        let graph = builder.build().unwrap();
        assert!(graph.find_node("New").is_some());
    }
}
