//! Error types for simulation operations.

use hn_hydraulics::SolverError;
use hn_network::{NetworkError, Side};
use hn_results::ResultsError;
use thiserror::Error;

/// Failure of a single pipe update.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermalError {
    #[error("Non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid thermal input: {what}")]
    InvalidInput { what: &'static str },
}

/// No pipe of a side can be ordered from its boundary.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Topology error on {side} side: {reason}")]
pub struct TopologyError {
    pub side: Side,
    pub reason: String,
}

/// Errors encountered during a transient run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration of {component}: {reason}")]
    Configuration { component: String, reason: String },

    #[error(
        "Topology error ({}): {reason}",
        .side.as_ref().map(|s| s.label()).unwrap_or("network")
    )]
    Topology { side: Option<Side>, reason: String },

    /// Pipe update failed even in the pure conduction fallback.
    #[error("Numerical failure in pipe {pipe} at step {step}: {reason}")]
    Numerical {
        pipe: String,
        step: usize,
        reason: String,
    },

    #[error("Hydraulic solve failed at step {step}: {source}")]
    Solver {
        step: usize,
        #[source]
        source: SolverError,
    },

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(component: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::Configuration {
            component: component.into(),
            reason: reason.into(),
        }
    }
}

impl From<NetworkError> for SimError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Configuration { component, reason } => {
                SimError::Configuration { component, reason }
            }
            NetworkError::Topology { reason } => SimError::Topology { side: None, reason },
            NetworkError::Graph(g) => SimError::config("graph", g.to_string()),
        }
    }
}

impl From<TopologyError> for SimError {
    fn from(e: TopologyError) -> Self {
        SimError::Topology {
            side: Some(e.side),
            reason: e.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_display_names_side() {
        let err: SimError = TopologyError {
            side: Side::Return,
            reason: "no pipe reaches the plant".into(),
        }
        .into();
        assert!(err.to_string().contains("return"));

        let err = SimError::Topology {
            side: None,
            reason: "no supply".into(),
        };
        assert!(err.to_string().contains("network"));
    }

    #[test]
    fn network_configuration_keeps_component() {
        let err: SimError = NetworkError::Configuration {
            component: "pipe p1".into(),
            reason: "bad".into(),
        }
        .into();
        assert!(
            matches!(err, SimError::Configuration { ref component, .. } if component == "pipe p1")
        );
    }
}
