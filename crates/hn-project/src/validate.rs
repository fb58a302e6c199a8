//! Structural checks on the file formats, before any conversion.

use std::collections::HashSet;

use crate::schema::{GroundDef, NetworkDef, SimulationDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_network(network: &NetworkDef) -> Result<(), ValidationError> {
    let mut node_ids = HashSet::new();
    for node in &network.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: format!("network '{}' nodes", network.name),
            });
        }
    }

    let mut pipe_ids = HashSet::new();
    for pipe in &network.pipes {
        if !pipe_ids.insert(pipe.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: pipe.id.clone(),
                context: format!("network '{}' pipes", network.name),
            });
        }
        for end in [&pipe.from, &pipe.to] {
            if !node_ids.contains(end.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: end.clone(),
                    context: format!("pipe '{}'", pipe.id),
                });
            }
        }
        if pipe.sections == 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("pipe '{}' sections", pipe.id),
                value: "0".to_string(),
                reason: "at least one section is required".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_simulation(def: &SimulationDef) -> Result<(), ValidationError> {
    let positive = [
        ("timestep_s", def.timestep_s),
        ("stop_time_s", def.stop_time_s),
        ("sample_interval_s", def.sample_interval_s),
        ("fluid.density_kg_m3", def.fluid.density_kg_m3),
        ("fluid.cp_j_kg_k", def.fluid.cp_j_kg_k),
        ("fluid.viscosity_pa_s", def.fluid.viscosity_pa_s),
    ];
    for (field, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be positive".to_string(),
            });
        }
    }
    if !(def.min_mass_flow_kg_s.is_finite() && def.min_mass_flow_kg_s >= 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "min_mass_flow_kg_s".to_string(),
            value: def.min_mass_flow_kg_s.to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    if let GroundDef::ByDepth { series } = &def.ground {
        let mut depths = HashSet::new();
        for s in series {
            if !depths.insert(s.depth_m.to_bits()) {
                return Err(ValidationError::DuplicateId {
                    id: s.depth_m.to_string(),
                    context: "ground depths".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeDef, NodeKind, PipeDef};

    fn junction(id: &str) -> NodeDef {
        NodeDef {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            kind: NodeKind::Junction,
        }
    }

    fn pipe(id: &str, from: &str, to: &str) -> PipeDef {
        PipeDef {
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            length_m: Some(10.0),
            inner_diameter_m: Some(0.1),
            roughness_m: 2.5e-5,
            insulation_thickness_m: Some(0.03),
            insulation_conductivity_w_mk: Some(0.035),
            sections: 4,
            ground_depth_m: 1.0,
            minor_loss: None,
        }
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let net = NetworkDef {
            name: "n".into(),
            nodes: vec![junction("a"), junction("a")],
            pipes: vec![],
        };
        assert!(matches!(
            validate_network(&net),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn dangling_pipe_end_is_rejected() {
        let net = NetworkDef {
            name: "n".into(),
            nodes: vec![junction("a")],
            pipes: vec![pipe("p", "a", "b")],
        };
        match validate_network(&net) {
            Err(ValidationError::MissingReference { id, .. }) => assert_eq!(id, "b"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let def = SimulationDef {
            timestep_s: 0.0,
            ..SimulationDef::default()
        };
        assert!(validate_simulation(&def).is_err());
        validate_simulation(&SimulationDef::default()).unwrap();
    }
}
