//! File formats: network JSON and simulation YAML.
//!
//! Quantities are plain SI numbers; field names carry the unit.

use serde::{Deserialize, Serialize};

use hn_results::HistoryMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub pipes: Vec<PipeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub kind: NodeKind,
}

/// Required attributes are optional here so a missing one is reported by
/// name instead of as a parse error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum NodeKind {
    Supply {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        p_flow_pa: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        p_return_pa: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        t_flow_k: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        t_return_k: Option<f64>,
        /// Fixed injection of a secondary plant, kg/s.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mass_flow_kg_s: Option<f64>,
    },
    Demand {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        design_delta_t_k: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heat_w: Option<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dhw_w: Vec<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cooling_w: Vec<f64>,
    },
    Junction,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Supply { .. } => "supply",
            NodeKind::Demand { .. } => "demand",
            NodeKind::Junction => "junction",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_diameter_m: Option<f64>,
    #[serde(default = "default_roughness")]
    pub roughness_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulation_thickness_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulation_conductivity_w_mk: Option<f64>,
    #[serde(default = "default_sections")]
    pub sections: u32,
    #[serde(default = "default_ground_depth")]
    pub ground_depth_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_loss: Option<f64>,
}

fn default_roughness() -> f64 {
    2.5e-5
}

fn default_sections() -> u32 {
    10
}

fn default_ground_depth() -> f64 {
    1.0
}

/// Run settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationDef {
    pub stop_time_s: f64,
    pub timestep_s: f64,
    pub sample_interval_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_temperature_k: Option<f64>,
    pub ground: GroundDef,
    pub demand_mode: DemandModeDef,
    pub history: HistoryMode,
    pub parallel: bool,
    pub parallel_threshold: usize,
    pub snap_to_catalog: bool,
    pub solver: SolverDef,
    pub fluid: FluidDef,
    pub min_mass_flow_kg_s: f64,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            stop_time_s: 86_400.0,
            timestep_s: 900.0,
            sample_interval_s: 3_600.0,
            initial_temperature_k: None,
            ground: GroundDef::default(),
            demand_mode: DemandModeDef::default(),
            history: HistoryMode::default(),
            parallel: true,
            parallel_threshold: 64,
            snap_to_catalog: false,
            solver: SolverDef::default(),
            fluid: FluidDef::default(),
            min_mass_flow_kg_s: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroundDef {
    Constant { temperature_k: f64 },
    ByDepth { series: Vec<DepthSeriesDef> },
}

impl Default for GroundDef {
    fn default() -> Self {
        GroundDef::Constant {
            temperature_k: 283.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepthSeriesDef {
    pub depth_m: f64,
    pub values_k: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DemandModeDef {
    #[default]
    Heating,
    HeatingAndDhw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
    pub min_pressure_pa: f64,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            min_pressure_pa: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FluidDef {
    pub density_kg_m3: f64,
    pub cp_j_kg_k: f64,
    pub viscosity_pa_s: f64,
}

impl Default for FluidDef {
    fn default() -> Self {
        Self {
            density_kg_m3: 983.0,
            cp_j_kg_k: 4180.0,
            viscosity_pa_s: 4.7e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_simulation_file_uses_defaults() {
        let def: SimulationDef = serde_yaml::from_str("{}").unwrap();
        assert_eq!(def, SimulationDef::default());
    }

    #[test]
    fn node_kind_is_tagged() {
        let node: NodeDef = serde_json::from_str(
            r#"{ "id": "J1", "kind": { "type": "Junction" } }"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Junction);
        assert_eq!(node.x, 0.0);
    }

    #[test]
    fn ground_by_depth_from_yaml() {
        let yaml = "
ground:
  type: by_depth
  series:
    - depth_m: 1.0
      values_k: [280.0, 281.0]
demand_mode: heating_and_dhw
history: full
";
        let def: SimulationDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.demand_mode, DemandModeDef::HeatingAndDhw);
        assert_eq!(def.history, HistoryMode::Full);
        match def.ground {
            GroundDef::ByDepth { series } => assert_eq!(series[0].values_k, vec![280.0, 281.0]),
            other => panic!("unexpected ground {other:?}"),
        }
    }
}
