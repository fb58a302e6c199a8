//! Network Assembler: physical graph -> dual-line hydraulic network.

use hn_core::units::{Length, m};
use hn_core::{JunctionId, ensure_finite, ensure_positive};
use hn_graph::{DemandAttrs, NetworkGraph, NodeIndex, NodeRole, PipeAttrs, SupplyAttrs};
use petgraph::algo::dijkstra;
use tracing::{debug, info, warn};

use crate::catalog::{estimate_minor_loss, snap_to_catalog};
use crate::error::{NetworkError, NetworkResult};
use crate::maps::{JunctionMap, PipeMap};
use crate::model::{HeatConsumer, HydraulicNetwork, Pipe, Pump, PumpMode, Side};

/// Assembly options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AssembleOptions {
    /// Replace each pipe's diameter and insulation with the nearest standard
    /// catalog size.
    pub snap_to_catalog: bool,
    /// Uniform initial temperature in K. Defaults to the reference plant's
    /// flow temperature on the supply side and its return temperature on the
    /// return side.
    pub initial_temperature: Option<f64>,
}

/// Build the hydraulic network for `graph`.
///
/// Pipes are oriented along the radial design direction: a breadth-first walk
/// from the reference plant orients supply pipes away from it and return pipes
/// towards it. Edges the walk cannot reach keep the order in which they were
/// added to the graph.
pub fn assemble(
    graph: &NetworkGraph,
    options: &AssembleOptions,
) -> NetworkResult<(HydraulicNetwork, JunctionMap, PipeMap)> {
    let (reference, reference_attrs) = graph
        .node_indices()
        .find_map(|n| match &graph.inner()[n].role {
            NodeRole::Supply(attrs) => Some((n, attrs.clone())),
            _ => None,
        })
        .ok_or_else(|| NetworkError::Topology {
            reason: format!("network '{}' has no supply node", graph.name()),
        })?;

    let (t_supply, t_return) = match options.initial_temperature {
        Some(t) => (t, t),
        None => (reference_attrs.t_flow.value, reference_attrs.t_return.value),
    };

    let mut net = HydraulicNetwork::new(graph.name());
    let mut junctions = JunctionMap::with_capacity(graph.node_count());
    let mut pipes = PipeMap::with_capacity(graph.edge_count());

    for node in graph.node_indices() {
        let weight = &graph.inner()[node];
        let s = net.add_junction(format!("supply.{}", weight.name), Side::Supply, t_supply);
        let r = net.add_junction(format!("return.{}", weight.name), Side::Return, t_return);
        junctions.insert(node, s, r);

        match &weight.role {
            NodeRole::Supply(attrs) => {
                check_supply(&weight.name, attrs)?;
                let mode = if node == reference {
                    PumpMode::PressureReference {
                        p_flow: attrs.p_flow.value,
                        p_return: attrs.p_return.value,
                    }
                } else {
                    if attrs.mass_flow.is_none() {
                        warn!(
                            supply = %weight.name,
                            "secondary supply without mass flow, feeding in 0 kg/s"
                        );
                    }
                    PumpMode::FixedMassFlow {
                        mass_flow: attrs.mass_flow.map(|q| q.value).unwrap_or(0.0),
                    }
                };
                net.add_pump(Pump {
                    name: weight.name.clone(),
                    supply_junction: s,
                    return_junction: r,
                    mode,
                    t_flow: attrs.t_flow.value,
                    mass_flow: 0.0,
                    return_temperature: attrs.t_return.value,
                });
            }
            NodeRole::Demand(attrs) => {
                check_demand(&weight.name, attrs)?;
                net.add_consumer(HeatConsumer {
                    name: weight.name.clone(),
                    supply_junction: s,
                    return_junction: r,
                    design_delta_t: attrs.design_delta_t,
                    heat: attrs.heat.clone(),
                    dhw: attrs.dhw.clone(),
                    demand: 0.0,
                    mass_flow: 0.0,
                    outlet_temperature: t_return,
                });
            }
            NodeRole::Junction => {}
        }
    }

    let depth = dijkstra(graph.inner(), reference, None, |_| 1usize);

    for edge in graph.edge_indices() {
        let weight = &graph.inner()[edge];
        let attrs = &weight.attrs;
        let component = format!("pipe {}", attrs.pipe_id);
        let Some((a, b)) = graph.endpoints(edge) else {
            continue;
        };
        let (near, far) = match (depth.get(&a), depth.get(&b)) {
            (Some(da), Some(db)) if db < da => (b, a),
            _ => (a, b),
        };

        let geom = PipeGeometry::from_attrs(&component, attrs, options.snap_to_catalog)?;
        let (s_near, r_near) = pair(&junctions, near)?;
        let (s_far, r_far) = pair(&junctions, far)?;

        let supply = net.add_pipe(geom.build(
            format!("supply.{}", attrs.pipe_id),
            Side::Supply,
            s_near,
            s_far,
            t_supply,
        ));
        let ret = net.add_pipe(geom.build(
            format!("return.{}", attrs.pipe_id),
            Side::Return,
            r_far,
            r_near,
            t_return,
        ));
        pipes.insert(edge, supply, ret);
    }

    let unreached = graph.node_count() - depth.len();
    if unreached > 0 {
        warn!(
            network = %graph.name(),
            unreached,
            "nodes not connected to the reference supply"
        );
    }
    info!(
        network = %graph.name(),
        junctions = net.junctions.len(),
        pipes = net.pipes.len(),
        pumps = net.pumps.len(),
        consumers = net.consumers.len(),
        "assembled hydraulic network"
    );

    Ok((net, junctions, pipes))
}

fn pair(map: &JunctionMap, node: NodeIndex) -> NetworkResult<(JunctionId, JunctionId)> {
    match (map.supply(node), map.ret(node)) {
        (Some(s), Some(r)) => Ok((s, r)),
        _ => Err(NetworkError::Topology {
            reason: format!("pipe endpoint {} has no junctions", node.index()),
        }),
    }
}

/// Validated pipe data shared by the supply and return pipe of one edge.
struct PipeGeometry {
    length: Length,
    inner_diameter: Length,
    roughness: Length,
    ground_depth: Length,
    minor_loss: f64,
    alpha: f64,
    sections: usize,
}

impl PipeGeometry {
    fn from_attrs(component: &str, attrs: &PipeAttrs, snap: bool) -> NetworkResult<Self> {
        let wrap = |e| NetworkError::from_core(component, e);

        let length = ensure_positive(attrs.length.value, "length").map_err(wrap)?;
        let mut diameter =
            ensure_positive(attrs.inner_diameter.value, "inner diameter").map_err(wrap)?;
        let roughness = ensure_finite(attrs.roughness.value, "roughness").map_err(wrap)?;
        if roughness < 0.0 {
            return Err(NetworkError::config(component, "roughness must not be negative"));
        }
        let mut insulation =
            ensure_positive(attrs.insulation_thickness.value, "insulation thickness")
                .map_err(wrap)?;
        let conductivity =
            ensure_positive(attrs.insulation_conductivity.value, "insulation conductivity")
                .map_err(wrap)?;
        if attrs.sections == 0 {
            return Err(NetworkError::config(component, "pipe needs at least one section"));
        }
        let ground_depth = ensure_finite(attrs.ground_depth.value, "ground depth").map_err(wrap)?;

        if snap {
            let entry = snap_to_catalog(diameter);
            debug!(
                pipe = %attrs.pipe_id,
                given = diameter,
                dn = entry.dn,
                "snapped pipe to catalog size"
            );
            diameter = entry.inner_diameter;
            insulation = entry.insulation_thickness;
        }

        let minor_loss = match attrs.minor_loss {
            Some(xi) => {
                let xi = ensure_finite(xi, "minor loss").map_err(wrap)?;
                if xi < 0.0 {
                    return Err(NetworkError::config(
                        component,
                        "minor loss must not be negative",
                    ));
                }
                xi
            }
            None => estimate_minor_loss(length),
        };

        Ok(Self {
            length: m(length),
            inner_diameter: m(diameter),
            roughness: m(roughness),
            ground_depth: m(ground_depth),
            minor_loss,
            alpha: conductivity / insulation,
            sections: attrs.sections as usize,
        })
    }

    fn build(
        &self,
        name: String,
        side: Side,
        from: JunctionId,
        to: JunctionId,
        temperature: f64,
    ) -> Pipe {
        Pipe::new(
            name,
            side,
            from,
            to,
            self.length,
            self.inner_diameter,
            self.roughness,
            self.ground_depth,
            self.minor_loss,
            self.alpha,
            self.sections,
            temperature,
        )
    }
}

fn check_supply(name: &str, attrs: &SupplyAttrs) -> NetworkResult<()> {
    let component = format!("supply {name}");
    let wrap = |e| NetworkError::from_core(&component, e);
    ensure_positive(attrs.p_flow.value, "flow pressure").map_err(wrap)?;
    ensure_positive(attrs.p_return.value, "return pressure").map_err(wrap)?;
    ensure_positive(attrs.t_flow.value, "flow temperature").map_err(wrap)?;
    ensure_positive(attrs.t_return.value, "return temperature").map_err(wrap)?;
    if attrs.pressure_lift().value <= 0.0 {
        return Err(NetworkError::config(
            &component,
            "flow pressure must exceed return pressure",
        ));
    }
    if let Some(q) = attrs.mass_flow {
        let q = ensure_finite(q.value, "mass flow").map_err(wrap)?;
        if q < 0.0 {
            return Err(NetworkError::config(&component, "mass flow must not be negative"));
        }
    }
    Ok(())
}

fn check_demand(name: &str, attrs: &DemandAttrs) -> NetworkResult<()> {
    let component = format!("demand {name}");
    ensure_positive(attrs.design_delta_t.value, "design temperature drop")
        .map_err(|e| NetworkError::from_core(&component, e))?;
    if attrs.heat.is_empty() {
        return Err(NetworkError::config(&component, "heat demand series is empty"));
    }
    if let Some(v) = attrs.heat.iter().chain(&attrs.dhw).find(|v| !v.is_finite()) {
        return Err(NetworkError::config(
            &component,
            format!("non-finite demand value {v}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{bar, dk, k, mm, w_per_m_k};
    use hn_graph::{GraphBuilder, Position};

    fn attrs(id: &str) -> PipeAttrs {
        PipeAttrs::new(id, m(100.0), mm(100.0), mm(0.025), mm(40.0), w_per_m_k(0.04), 4)
    }

    #[test]
    fn no_supply_is_a_topology_error() {
        let mut b = GraphBuilder::new("t");
        b.add_junction("J", Position::default()).unwrap();
        let graph = b.build().unwrap();
        let err = assemble(&graph, &AssembleOptions::default()).unwrap_err();
        assert!(matches!(err, NetworkError::Topology { .. }));
    }

    #[test]
    fn alpha_is_conductivity_over_thickness() {
        let mut b = GraphBuilder::new("t");
        let s = b
            .add_supply(
                "S",
                Position::default(),
                SupplyAttrs::pressure_reference(bar(5.0), bar(2.0), k(353.15), k(323.15)),
            )
            .unwrap();
        let d = b
            .add_demand("D", Position::default(), DemandAttrs::heating(dk(30.0), vec![1.0]))
            .unwrap();
        b.add_pipe(s, d, attrs("p")).unwrap();
        let graph = b.build().unwrap();
        let (net, _, _) = assemble(&graph, &AssembleOptions::default()).unwrap();
        assert!((net.pipes[0].alpha - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_sections_rejected() {
        let mut a = attrs("p");
        a.sections = 0;
        let err = PipeGeometry::from_attrs("pipe p", &a, false).err().unwrap();
        assert!(matches!(err, NetworkError::Configuration { .. }));
    }
}
