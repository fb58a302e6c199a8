use hn_core::units::{bar, dk, k, m, mm, w_per_m_k};
use hn_graph::{DemandAttrs, GraphBuilder, NetworkGraph, PipeAttrs, Position, SupplyAttrs};
use hn_hydraulics::{HydraulicSolution, HydraulicSolver, PipeFlow, SolverResult, SolverSettings};
use hn_network::{HydraulicNetwork, Side};
use hn_sim::{Simulation, SimulationConfig, SimulationContext, UNREACHED};
use proptest::prelude::*;

const FLOW: f64 = 2.0;

fn pipe(id: &str, length: f64) -> PipeAttrs {
    PipeAttrs::new(id, m(length), mm(100.0), mm(0.025), mm(38.0), w_per_m_k(0.035), 3)
}

/// P1 - J - P2 with consumer H off J. P2 is a secondary plant.
fn two_plants() -> NetworkGraph {
    let mut b = GraphBuilder::new("two-plants");
    let p1 = b
        .add_supply(
            "P1",
            Position::default(),
            SupplyAttrs::pressure_reference(bar(5.0), bar(2.0), k(353.15), k(323.15)),
        )
        .unwrap();
    let p2 = b
        .add_supply(
            "P2",
            Position::default(),
            SupplyAttrs::pressure_reference(bar(5.0), bar(2.0), k(363.15), k(323.15)),
        )
        .unwrap();
    let j = b.add_junction("J", Position::default()).unwrap();
    let heat = FLOW * 4180.0 * 30.0;
    let h = b
        .add_demand("H", Position::default(), DemandAttrs::heating(dk(30.0), vec![heat; 2]))
        .unwrap();
    b.add_pipe(p1, j, pipe("p1", 60.0)).unwrap();
    b.add_pipe(j, p2, pipe("p2", 60.0)).unwrap();
    b.add_pipe(j, h, pipe("h", 40.0)).unwrap();
    b.build().unwrap()
}

/// Plays back fixed flow fields: P1 feeds on the first call, P2 afterwards.
struct Scripted {
    calls: usize,
}

impl HydraulicSolver for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(
        &mut self,
        network: &HydraulicNetwork,
        _settings: &SolverSettings,
    ) -> SolverResult<HydraulicSolution> {
        let from_p2 = self.calls > 0;
        self.calls += 1;
        let flow_of = |name: &str| match (name, from_p2) {
            ("supply.h" | "return.h", _) => FLOW,
            ("supply.p1" | "return.p1", false) => FLOW,
            ("supply.p2" | "return.p2", true) => -FLOW,
            _ => 0.0,
        };
        let pressures: Vec<f64> = network
            .junctions
            .iter()
            .map(|j| match j.side {
                Side::Supply => 5e5,
                Side::Return => 2e5,
            })
            .collect();
        Ok(HydraulicSolution {
            pipe_flows: network
                .pipes
                .iter()
                .map(|p| PipeFlow {
                    mass_flow: flow_of(&p.name),
                    p_from: pressures[p.from.index()],
                    p_to: pressures[p.to.index()],
                })
                .collect(),
            junction_pressures: pressures,
            consumer_flows: network.consumers.iter().map(|c| c.mass_flow).collect(),
            pump_flows: network
                .pumps
                .iter()
                .map(|p| if p.is_reference() != from_p2 { FLOW } else { 0.0 })
                .collect(),
            iterations: 0,
            residual_norm: 0.0,
        })
    }
}

#[test]
fn flow_reversal_reorders_layers() {
    let graph = two_plants();
    let config = SimulationConfig {
        stop_time: 7_200.0,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(&graph, SimulationContext::new(config), Scripted { calls: 0 })
        .unwrap();

    let edge = |id: &str| graph.find_pipe(id).unwrap();
    let supply_p2 = sim.maps().pipes.supply(edge("p2")).unwrap();
    let supply_h = sim.maps().pipes.supply(edge("h")).unwrap();
    let return_p2 = sim.maps().pipes.ret(edge("p2")).unwrap();
    let return_h = sim.maps().pipes.ret(edge("h")).unwrap();
    let j = sim.maps().junctions.supply(graph.find_node("J").unwrap()).unwrap();

    assert!(!sim.network().pipe(supply_p2).flow_reversed);
    assert_eq!(sim.layers(Side::Supply).layer(supply_h), 2);

    for _ in 0..4 {
        sim.step_once().unwrap();
    }
    assert!(sim.network().junction(j).temperature < 354.0);
    assert_eq!(sim.stats().reorientations, 0);

    sim.run_to_end(|_| {}).unwrap();
    let stats = sim.stats();
    assert_eq!(stats.reorientations, 2);
    assert!(sim.network().pipe(supply_p2).flow_reversed);
    assert!(sim.network().pipe(return_p2).flow_reversed);
    assert_eq!(sim.layers(Side::Supply).layer(supply_p2), 1);
    assert_eq!(sim.layers(Side::Supply).layer(supply_h), 2);
    assert_eq!(sim.layers(Side::Return).layer(return_h), 1);
    assert_eq!(sim.layers(Side::Return).layer(return_p2), 2);

    // Water now arrives from the hotter plant.
    assert!(sim.network().junction(j).temperature > 358.0);
}

/// Tree rooted at a plant; node `i + 1` hangs off `parents[i] % (i + 1)`.
fn tree(parents: &[usize], lengths: &[f64]) -> NetworkGraph {
    let mut b = GraphBuilder::new("tree");
    let mut nodes = vec![b
        .add_supply(
            "plant",
            Position::default(),
            SupplyAttrs::pressure_reference(bar(6.0), bar(2.0), k(353.15), k(323.15)),
        )
        .unwrap()];
    for (i, parent) in parents.iter().enumerate() {
        let node = b
            .add_demand(
                format!("H{i}"),
                Position::default(),
                DemandAttrs::heating(dk(30.0), vec![4e3]),
            )
            .unwrap();
        b.add_pipe(nodes[parent % (i + 1)], node, pipe(&format!("p{i}"), lengths[i]))
            .unwrap();
        nodes.push(node);
    }
    b.build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn feeding_pipes_carry_lower_layers(
        parents in proptest::collection::vec(0usize..1000, 1..10),
        lengths in proptest::collection::vec(20.0f64..200.0, 10),
    ) {
        let graph = tree(&parents, &lengths);
        let config = SimulationConfig { stop_time: 3_600.0, ..SimulationConfig::default() };
        let sim = Simulation::with_reference_solver(&graph, SimulationContext::new(config)).unwrap();
        let net = sim.network();

        for side in [Side::Supply, Side::Return] {
            let layers = sim.layers(side);
            let pipes = net.pipes_on(side);
            prop_assert_eq!(layers.reached_count(), pipes.len());
            for &q in &pipes {
                let lq = layers.layer(q);
                prop_assert!(lq != UNREACHED);
                for &p in &pipes {
                    if net.pipe(p).outlet() == net.pipe(q).inlet() {
                        prop_assert!(layers.layer(p) < lq);
                    }
                }
            }
        }
    }
}
