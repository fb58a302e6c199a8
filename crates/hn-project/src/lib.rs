//! hn-project: network and simulation file formats and their validation.

pub mod convert;
pub mod schema;
pub mod validate;

pub use convert::{from_graph, to_config, to_context, to_graph};
pub use schema::*;
pub use validate::{ValidationError, validate_network, validate_simulation};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Missing attribute '{attribute}' on {component}")]
    MissingAttribute { component: String, attribute: String },

    #[error("Graph error: {0}")]
    Graph(#[from] hn_graph::GraphError),

    #[error("Simulation settings error: {0}")]
    Simulation(#[from] hn_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_network(path: &Path) -> ProjectResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    let network: NetworkDef = serde_json::from_str(&content)?;
    validate_network(&network)?;
    Ok(network)
}

pub fn save_network(path: &Path, network: &NetworkDef) -> ProjectResult<()> {
    validate_network(network)?;
    let content = serde_json::to_string_pretty(network)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_simulation(path: &Path) -> ProjectResult<SimulationDef> {
    let content = std::fs::read_to_string(path)?;
    let def: SimulationDef = serde_yaml::from_str(&content)?;
    validate_simulation(&def)?;
    Ok(def)
}

pub fn save_simulation(path: &Path, def: &SimulationDef) -> ProjectResult<()> {
    validate_simulation(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}
