//! Copy recorded series back onto the network graph.

use hn_graph::NetworkGraph;
use hn_network::{JunctionMap, PipeMap};
use hn_results::{Recorder, Variable};

use crate::error::{SimError, SimResult};

/// Id maps produced at assembly, needed to find graph elements again.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkMaps {
    pub junctions: JunctionMap,
    pub pipes: PipeMap,
}

/// Store each node's supply/return pressure and temperature series and each
/// edge's supply/return mass flow, velocity and outlet temperature series.
pub fn write_back(
    graph: &mut NetworkGraph,
    maps: &NetworkMaps,
    recorder: &Recorder,
) -> SimResult<()> {
    let column = |variable: Variable, index: usize| -> SimResult<Vec<f64>> {
        recorder
            .table(variable)
            .values
            .get(index)
            .cloned()
            .ok_or(SimError::InvalidArg {
                what: "recorder does not match the network maps",
            })
    };

    for (node, s, r) in maps.junctions.iter() {
        let supply_p = column(Variable::JunctionPressure, s.index())?;
        let supply_t = column(Variable::JunctionTemperature, s.index())?;
        let ret_p = column(Variable::JunctionPressure, r.index())?;
        let ret_t = column(Variable::JunctionTemperature, r.index())?;
        let weight = graph.node_mut(node).ok_or(SimError::InvalidArg {
            what: "junction map refers to a missing graph node",
        })?;
        weight.results.supply.pressure = supply_p;
        weight.results.supply.temperature = supply_t;
        weight.results.ret.pressure = ret_p;
        weight.results.ret.temperature = ret_t;
    }

    for (edge, s, r) in maps.pipes.iter() {
        let series = |pipe: usize| -> SimResult<hn_graph::PipeSeries> {
            Ok(hn_graph::PipeSeries {
                mass_flow: column(Variable::PipeMassFlow, pipe)?,
                velocity: column(Variable::PipeVelocity, pipe)?,
                outlet_temperature: column(Variable::PipeOutletTemperature, pipe)?,
            })
        };
        let supply = series(s.index())?;
        let ret = series(r.index())?;
        let weight = graph.edge_mut(edge).ok_or(SimError::InvalidArg {
            what: "pipe map refers to a missing graph edge",
        })?;
        weight.results.supply = supply;
        weight.results.ret = ret;
    }
    Ok(())
}
