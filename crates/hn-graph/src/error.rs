//! Graph-specific error types.

use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two nodes share a name.
    #[error("Duplicate node name: {name}")]
    DuplicateNode { name: String },

    /// Two pipes share a pipe id.
    #[error("Duplicate pipe id: {pipe_id}")]
    DuplicatePipe { pipe_id: String },

    /// A pipe refers to a node index that doesn't exist.
    #[error("Pipe {pipe_id} refers to non-existent node {index}")]
    InvalidNodeRef { pipe_id: String, index: usize },

    /// A pipe starts and ends at the same node.
    #[error("Pipe {pipe_id} connects node {node} to itself")]
    SelfLoop { pipe_id: String, node: String },

    /// The graph has no nodes at all.
    #[error("Network {name} has no nodes")]
    Empty { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_component() {
        let err = GraphError::SelfLoop {
            pipe_id: "p7".into(),
            node: "J3".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("p7"));
        assert!(msg.contains("J3"));
    }
}
