//! Side tables linking graph indices to hydraulic ids.
//!
//! Provides O(1) lookup in both directions. These maps are the only channel
//! through which simulated values find their way back onto the graph.

use hn_core::{JunctionId, PipeId};
use hn_graph::{EdgeIndex, NodeIndex};

use crate::model::Side;

/// Graph node <-> (supply junction, return junction).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JunctionMap {
    /// Indexed by `NodeIndex::index()`.
    by_node: Vec<(JunctionId, JunctionId)>,
    /// Indexed by `JunctionId::index()`.
    node_of: Vec<NodeIndex>,
}

impl JunctionMap {
    pub(crate) fn with_capacity(nodes: usize) -> Self {
        Self {
            by_node: Vec::with_capacity(nodes),
            node_of: Vec::with_capacity(2 * nodes),
        }
    }

    /// Record the pair created for `node`. Nodes must be inserted in index
    /// order and junction ids must be the next two arena slots.
    pub(crate) fn insert(&mut self, node: NodeIndex, supply: JunctionId, ret: JunctionId) {
        debug_assert_eq!(node.index(), self.by_node.len());
        self.by_node.push((supply, ret));
        for id in [supply, ret] {
            if self.node_of.len() <= id.index() {
                self.node_of.resize(id.index() + 1, node);
            }
            self.node_of[id.index()] = node;
        }
    }

    pub fn junction(&self, node: NodeIndex, side: Side) -> Option<JunctionId> {
        let (s, r) = *self.by_node.get(node.index())?;
        Some(match side {
            Side::Supply => s,
            Side::Return => r,
        })
    }

    pub fn supply(&self, node: NodeIndex) -> Option<JunctionId> {
        self.junction(node, Side::Supply)
    }

    pub fn ret(&self, node: NodeIndex) -> Option<JunctionId> {
        self.junction(node, Side::Return)
    }

    /// Graph node a junction was created for.
    pub fn node(&self, junction: JunctionId) -> Option<NodeIndex> {
        self.node_of.get(junction.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// `(node, supply, return)` triples in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, JunctionId, JunctionId)> + '_ {
        self.by_node
            .iter()
            .enumerate()
            .map(|(i, &(s, r))| (NodeIndex::new(i), s, r))
    }
}

/// Graph edge <-> (supply pipe, return pipe).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeMap {
    by_edge: Vec<(PipeId, PipeId)>,
    edge_of: Vec<EdgeIndex>,
}

impl PipeMap {
    pub(crate) fn with_capacity(edges: usize) -> Self {
        Self {
            by_edge: Vec::with_capacity(edges),
            edge_of: Vec::with_capacity(2 * edges),
        }
    }

    pub(crate) fn insert(&mut self, edge: EdgeIndex, supply: PipeId, ret: PipeId) {
        debug_assert_eq!(edge.index(), self.by_edge.len());
        self.by_edge.push((supply, ret));
        for id in [supply, ret] {
            if self.edge_of.len() <= id.index() {
                self.edge_of.resize(id.index() + 1, edge);
            }
            self.edge_of[id.index()] = edge;
        }
    }

    pub fn pipe(&self, edge: EdgeIndex, side: Side) -> Option<PipeId> {
        let (s, r) = *self.by_edge.get(edge.index())?;
        Some(match side {
            Side::Supply => s,
            Side::Return => r,
        })
    }

    pub fn supply(&self, edge: EdgeIndex) -> Option<PipeId> {
        self.pipe(edge, Side::Supply)
    }

    pub fn ret(&self, edge: EdgeIndex) -> Option<PipeId> {
        self.pipe(edge, Side::Return)
    }

    pub fn edge(&self, pipe: PipeId) -> Option<EdgeIndex> {
        self.edge_of.get(pipe.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_edge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_edge.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeIndex, PipeId, PipeId)> + '_ {
        self.by_edge
            .iter()
            .enumerate()
            .map(|(i, &(s, r))| (EdgeIndex::new(i), s, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junction_map_is_bidirectional() {
        let mut map = JunctionMap::with_capacity(2);
        map.insert(NodeIndex::new(0), JunctionId::from_index(0), JunctionId::from_index(1));
        map.insert(NodeIndex::new(1), JunctionId::from_index(2), JunctionId::from_index(3));

        assert_eq!(map.ret(NodeIndex::new(1)), Some(JunctionId::from_index(3)));
        assert_eq!(map.node(JunctionId::from_index(2)), Some(NodeIndex::new(1)));
        assert_eq!(map.node(JunctionId::from_index(9)), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn pipe_map_is_bidirectional() {
        let mut map = PipeMap::with_capacity(1);
        map.insert(EdgeIndex::new(0), PipeId::from_index(0), PipeId::from_index(1));
        assert_eq!(map.supply(EdgeIndex::new(0)), Some(PipeId::from_index(0)));
        assert_eq!(map.edge(PipeId::from_index(1)), Some(EdgeIndex::new(0)));
        assert_eq!(map.pipe(EdgeIndex::new(4), Side::Return), None);
    }
}
