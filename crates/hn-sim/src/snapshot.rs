//! Conversion of the live network state into recorder rows.

use hn_network::HydraulicNetwork;
use hn_results::{Frame, RecorderLayout};

/// Column names in arena order.
pub fn layout(network: &HydraulicNetwork) -> RecorderLayout {
    RecorderLayout {
        junctions: network.junctions.iter().map(|j| j.name.clone()).collect(),
        pipes: network.pipes.iter().map(|p| p.name.clone()).collect(),
        consumers: network.consumers.iter().map(|c| c.name.clone()).collect(),
        pumps: network.pumps.iter().map(|p| p.name.clone()).collect(),
    }
}

/// Current values of every recorded variable.
pub fn frame(network: &HydraulicNetwork, cp: f64) -> Frame {
    let pipes = &network.pipes;
    let consumers = &network.consumers;
    let pumps = &network.pumps;
    Frame {
        junction_pressure: network.junctions.iter().map(|j| j.pressure).collect(),
        junction_temperature: network.junctions.iter().map(|j| j.temperature).collect(),
        pipe_mass_flow: pipes.iter().map(|p| p.mass_flow).collect(),
        pipe_velocity: pipes.iter().map(|p| p.velocity).collect(),
        pipe_pressure_from: pipes.iter().map(|p| p.p_from).collect(),
        pipe_pressure_to: pipes.iter().map(|p| p.p_to).collect(),
        pipe_outlet_temperature: pipes.iter().map(|p| p.outlet_temperature).collect(),
        consumer_mass_flow: consumers.iter().map(|c| c.mass_flow).collect(),
        consumer_outlet_temperature: consumers.iter().map(|c| c.outlet_temperature).collect(),
        consumer_demand: consumers.iter().map(|c| c.demand).collect(),
        pump_mass_flow: pumps.iter().map(|p| p.mass_flow).collect(),
        pump_return_temperature: pumps.iter().map(|p| p.return_temperature).collect(),
        pump_heat_flow: pumps.iter().map(|p| p.heat_flow(cp)).collect(),
    }
}
