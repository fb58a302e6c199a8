//! Graph validation logic.

use std::collections::HashSet;

use petgraph::Undirected;
use petgraph::graph::Graph;

use crate::error::{GraphError, GraphResult};
use crate::graph::{GraphEdge, GraphNode};

/// Validate the frozen structure: non-empty, unique names and pipe ids,
/// no self loops.
///
/// The builder rejects most of these eagerly; this pass re-checks the whole
/// graph so that a `NetworkGraph` is always consistent.
pub(crate) fn validate_structure(
    name: &str,
    graph: &Graph<GraphNode, GraphEdge, Undirected>,
) -> GraphResult<()> {
    if graph.node_count() == 0 {
        return Err(GraphError::Empty {
            name: name.to_string(),
        });
    }

    let mut names = HashSet::new();
    for node in graph.node_weights() {
        if !names.insert(node.name.as_str()) {
            return Err(GraphError::DuplicateNode {
                name: node.name.clone(),
            });
        }
    }

    let mut pipe_ids = HashSet::new();
    for edge in graph.edge_indices() {
        let weight = &graph[edge];
        if !pipe_ids.insert(weight.attrs.pipe_id.as_str()) {
            return Err(GraphError::DuplicatePipe {
                pipe_id: weight.attrs.pipe_id.clone(),
            });
        }
        if let Some((a, b)) = graph.edge_endpoints(edge)
            && a == b
        {
            return Err(GraphError::SelfLoop {
                pipe_id: weight.attrs.pipe_id.clone(),
                node: graph[a].name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_empty_graph() {
        let graph: Graph<GraphNode, GraphEdge, Undirected> = Graph::new_undirected();
        let err = validate_structure("empty", &graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::Empty {
                name: "empty".into()
            }
        );
    }
}
