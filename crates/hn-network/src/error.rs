//! Error types for network assembly.

use hn_core::HnError;
use hn_graph::GraphError;
use thiserror::Error;

/// Errors raised while turning the physical graph into a hydraulic network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A node or pipe carries an unusable attribute.
    #[error("Invalid configuration of {component}: {reason}")]
    Configuration { component: String, reason: String },

    /// The graph cannot be operated as a district heating network.
    #[error("Topology error: {reason}")]
    Topology { reason: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl NetworkError {
    pub(crate) fn config(component: &str, reason: impl Into<String>) -> Self {
        NetworkError::Configuration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the offending component to a low-level numeric error.
    pub(crate) fn from_core(component: &str, err: HnError) -> Self {
        Self::config(component, err.to_string())
    }
}
