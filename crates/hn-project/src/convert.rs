//! Conversion of validated file contents into the typed model.

use std::collections::HashMap;

use hn_core::units::{dk, k, kgps, m, pa, w_per_m_k};
use hn_core::{FluidProperties, Tolerances};
use hn_graph::{
    DemandAttrs, GraphBuilder, NetworkGraph, NodeIndex, NodeRole, PipeAttrs, Position,
    SupplyAttrs,
};
use hn_hydraulics::SolverSettings;
use hn_sim::{DemandMode, DepthSeries, GroundProfile, SimulationConfig, SimulationContext};

use crate::schema::{
    DemandModeDef, GroundDef, NetworkDef, NodeDef, NodeKind, PipeDef, SimulationDef,
};
use crate::{ProjectError, ProjectResult};

fn required<T: Clone>(value: &Option<T>, component: &str, attribute: &str) -> ProjectResult<T> {
    value.clone().ok_or_else(|| ProjectError::MissingAttribute {
        component: component.to_string(),
        attribute: attribute.to_string(),
    })
}

/// Build the physical graph. Every required attribute must be present.
pub fn to_graph(def: &NetworkDef) -> ProjectResult<NetworkGraph> {
    let mut builder = GraphBuilder::new(def.name.clone());
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for node in &def.nodes {
        let idx = add_node(&mut builder, node)?;
        index.insert(node.id.as_str(), idx);
    }
    for pipe in &def.pipes {
        let from = lookup(&index, &pipe.from, &pipe.id)?;
        let to = lookup(&index, &pipe.to, &pipe.id)?;
        builder.add_pipe(from, to, pipe_attrs(pipe)?)?;
    }

    let graph = builder.build()?;
    tracing::debug!(
        network = %def.name,
        nodes = graph.node_count(),
        pipes = graph.edge_count(),
        "network graph built"
    );
    Ok(graph)
}

fn lookup(index: &HashMap<&str, NodeIndex>, id: &str, pipe: &str) -> ProjectResult<NodeIndex> {
    index.get(id).copied().ok_or_else(|| {
        ProjectError::Validation(crate::ValidationError::MissingReference {
            id: id.to_string(),
            context: format!("pipe '{pipe}'"),
        })
    })
}

fn add_node(builder: &mut GraphBuilder, node: &NodeDef) -> ProjectResult<NodeIndex> {
    let position = Position::new(node.x, node.y);
    let component = format!("{} {}", node.kind.label(), node.id);
    let idx = match &node.kind {
        NodeKind::Supply {
            p_flow_pa,
            p_return_pa,
            t_flow_k,
            t_return_k,
            mass_flow_kg_s,
        } => {
            let mut attrs = SupplyAttrs::pressure_reference(
                pa(required(p_flow_pa, &component, "p_flow_pa")?),
                pa(required(p_return_pa, &component, "p_return_pa")?),
                k(required(t_flow_k, &component, "t_flow_k")?),
                k(required(t_return_k, &component, "t_return_k")?),
            );
            attrs.mass_flow = mass_flow_kg_s.map(kgps);
            builder.add_supply(node.id.clone(), position, attrs)?
        }
        NodeKind::Demand {
            design_delta_t_k,
            heat_w,
            dhw_w,
            cooling_w,
        } => {
            let attrs = DemandAttrs::heating(
                dk(required(design_delta_t_k, &component, "design_delta_t_k")?),
                required(heat_w, &component, "heat_w")?,
            )
            .with_dhw(dhw_w.clone())
            .with_cooling(cooling_w.clone());
            builder.add_demand(node.id.clone(), position, attrs)?
        }
        NodeKind::Junction => builder.add_junction(node.id.clone(), position)?,
    };
    Ok(idx)
}

fn pipe_attrs(pipe: &PipeDef) -> ProjectResult<PipeAttrs> {
    let component = format!("pipe {}", pipe.id);
    let mut attrs = PipeAttrs::new(
        pipe.id.clone(),
        m(required(&pipe.length_m, &component, "length_m")?),
        m(required(&pipe.inner_diameter_m, &component, "inner_diameter_m")?),
        m(pipe.roughness_m),
        m(required(
            &pipe.insulation_thickness_m,
            &component,
            "insulation_thickness_m",
        )?),
        w_per_m_k(required(
            &pipe.insulation_conductivity_w_mk,
            &component,
            "insulation_conductivity_w_mk",
        )?),
        pipe.sections,
    )
    .with_ground_depth(m(pipe.ground_depth_m));
    attrs.minor_loss = pipe.minor_loss;
    Ok(attrs)
}

/// Inverse of [`to_graph`], used to save networks built in code.
pub fn from_graph(graph: &NetworkGraph) -> NetworkDef {
    let nodes = graph
        .node_indices()
        .filter_map(|idx| graph.node(idx))
        .map(|node| NodeDef {
            id: node.name.clone(),
            x: node.position.x,
            y: node.position.y,
            kind: match &node.role {
                NodeRole::Supply(a) => NodeKind::Supply {
                    p_flow_pa: Some(a.p_flow.value),
                    p_return_pa: Some(a.p_return.value),
                    t_flow_k: Some(a.t_flow.value),
                    t_return_k: Some(a.t_return.value),
                    mass_flow_kg_s: a.mass_flow.map(|q| q.value),
                },
                NodeRole::Demand(a) => NodeKind::Demand {
                    design_delta_t_k: Some(a.design_delta_t.value),
                    heat_w: Some(a.heat.clone()),
                    dhw_w: a.dhw.clone(),
                    cooling_w: a.cooling.clone(),
                },
                NodeRole::Junction => NodeKind::Junction,
            },
        })
        .collect();

    let pipes = graph
        .edge_indices()
        .filter_map(|idx| {
            let (a, b) = graph.endpoints(idx)?;
            let edge = graph.edge(idx)?;
            let attrs = &edge.attrs;
            Some(PipeDef {
                id: attrs.pipe_id.clone(),
                from: graph.node(a)?.name.clone(),
                to: graph.node(b)?.name.clone(),
                length_m: Some(attrs.length.value),
                inner_diameter_m: Some(attrs.inner_diameter.value),
                roughness_m: attrs.roughness.value,
                insulation_thickness_m: Some(attrs.insulation_thickness.value),
                insulation_conductivity_w_mk: Some(attrs.insulation_conductivity.value),
                sections: attrs.sections,
                ground_depth_m: attrs.ground_depth.value,
                minor_loss: attrs.minor_loss,
            })
        })
        .collect();

    NetworkDef {
        name: graph.name().to_string(),
        nodes,
        pipes,
    }
}

pub fn to_config(def: &SimulationDef) -> SimulationConfig {
    SimulationConfig {
        stop_time: def.stop_time_s,
        timestep: def.timestep_s,
        sample_interval: def.sample_interval_s,
        initial_temperature: def.initial_temperature_k,
        ground: match &def.ground {
            GroundDef::Constant { temperature_k } => GroundProfile::Constant(*temperature_k),
            GroundDef::ByDepth { series } => GroundProfile::ByDepth(
                series
                    .iter()
                    .map(|s| DepthSeries {
                        depth: s.depth_m,
                        values: s.values_k.clone(),
                    })
                    .collect(),
            ),
        },
        demand_mode: match def.demand_mode {
            DemandModeDef::Heating => DemandMode::Heating,
            DemandModeDef::HeatingAndDhw => DemandMode::HeatingAndDhw,
        },
        history: def.history,
        parallel: def.parallel,
        parallel_threshold: def.parallel_threshold,
        snap_to_catalog: def.snap_to_catalog,
        solver: SolverSettings {
            max_iterations: def.solver.max_iterations,
            tolerance: def.solver.tolerance,
            line_search_beta: def.solver.line_search_beta,
            max_line_search_iters: def.solver.max_line_search_iters,
            min_pressure: def.solver.min_pressure_pa,
        },
    }
}

/// Full run context, with the span named after `network`.
pub fn to_context(def: &SimulationDef, network: &str) -> ProjectResult<SimulationContext> {
    let config = to_config(def);
    config.validate()?;
    let fluid = FluidProperties::new(
        def.fluid.density_kg_m3,
        def.fluid.cp_j_kg_k,
        def.fluid.viscosity_pa_s,
    );
    let tolerances = Tolerances {
        min_mass_flow: def.min_mass_flow_kg_s,
        ..Tolerances::default()
    };
    Ok(SimulationContext::new(config)
        .with_fluid(fluid)
        .with_tolerances(tolerances)
        .with_span_for(network))
}
