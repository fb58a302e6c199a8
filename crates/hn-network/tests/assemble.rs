use approx::assert_relative_eq;
use hn_core::units::{bar, dk, k, kgps, m, mm, w_per_m_k};
use hn_graph::{DemandAttrs, GraphBuilder, NetworkGraph, PipeAttrs, Position, SupplyAttrs};
use hn_network::{AssembleOptions, NetworkError, PumpMode, Side, assemble, estimate_minor_loss};

fn pipe(id: &str) -> PipeAttrs {
    PipeAttrs::new(id, m(60.0), mm(100.0), mm(0.025), mm(38.0), w_per_m_k(0.035), 3)
}

fn plant() -> SupplyAttrs {
    SupplyAttrs::pressure_reference(bar(5.0), bar(2.0), k(353.15), k(323.15))
}

/// plant - J - H1, J - H2; the second branch is added from the leaf inward.
fn star() -> NetworkGraph {
    let mut b = GraphBuilder::new("star");
    let s = b.add_supply("plant", Position::default(), plant()).unwrap();
    let j = b.add_junction("J", Position::default()).unwrap();
    let h1 = b
        .add_demand("H1", Position::default(), DemandAttrs::heating(dk(30.0), vec![5e3]))
        .unwrap();
    let h2 = b
        .add_demand("H2", Position::default(), DemandAttrs::heating(dk(30.0), vec![7e3]))
        .unwrap();
    b.add_pipe(s, j, pipe("main")).unwrap();
    b.add_pipe(j, h1, pipe("b1")).unwrap();
    b.add_pipe(h2, j, pipe("b2")).unwrap();
    b.build().unwrap()
}

#[test]
fn two_junctions_per_node_and_two_pipes_per_edge() {
    let graph = star();
    let (net, jmap, pmap) = assemble(&graph, &AssembleOptions::default()).unwrap();

    assert_eq!(net.junctions.len(), 2 * graph.node_count());
    assert_eq!(net.pipes.len(), 2 * graph.edge_count());
    assert_eq!(net.pumps.len(), 1);
    assert_eq!(net.consumers.len(), 2);

    for node in graph.node_indices() {
        let s = jmap.supply(node).unwrap();
        let r = jmap.ret(node).unwrap();
        assert_ne!(s, r);
        assert_eq!(net.junction(s).side, Side::Supply);
        assert_eq!(net.junction(r).side, Side::Return);
        assert_eq!(jmap.node(s), Some(node));
        assert_eq!(jmap.node(r), Some(node));
    }
    for edge in graph.edge_indices() {
        let s = pmap.supply(edge).unwrap();
        let r = pmap.ret(edge).unwrap();
        assert_eq!(pmap.edge(s), Some(edge));
        assert_eq!(pmap.edge(r), Some(edge));
        assert_eq!(net.pipe(s).profile().len(), 4);
    }
}

#[test]
fn supply_pipes_point_away_from_plant() {
    let graph = star();
    let (net, jmap, pmap) = assemble(&graph, &AssembleOptions::default()).unwrap();
    let j = graph.find_node("J").unwrap();
    let h2 = graph.find_node("H2").unwrap();
    let b2 = graph.find_pipe("b2").unwrap();

    let supply = net.pipe(pmap.supply(b2).unwrap());
    assert_eq!(supply.from, jmap.supply(j).unwrap());
    assert_eq!(supply.to, jmap.supply(h2).unwrap());

    let ret = net.pipe(pmap.ret(b2).unwrap());
    assert_eq!(ret.from, jmap.ret(h2).unwrap());
    assert_eq!(ret.to, jmap.ret(j).unwrap());
}

#[test]
fn reference_pump_and_consumers() {
    let graph = star();
    let (net, jmap, _) = assemble(&graph, &AssembleOptions::default()).unwrap();
    let pump = net.pump(net.reference_pump().unwrap());
    assert_eq!(
        pump.mode,
        PumpMode::PressureReference {
            p_flow: 5e5,
            p_return: 2e5
        }
    );
    let plant = graph.find_node("plant").unwrap();
    assert_eq!(pump.supply_junction, jmap.supply(plant).unwrap());
    assert_eq!(net.boundary_junctions(Side::Return), vec![jmap.ret(plant).unwrap()]);

    let h1 = &net.consumers[0];
    assert_eq!(h1.name, "H1");
    assert_eq!(h1.heat, vec![5e3]);
}

#[test]
fn secondary_supply_is_fixed_mass_flow() {
    let mut b = GraphBuilder::new("two plants");
    let s1 = b.add_supply("S1", Position::default(), plant()).unwrap();
    let mut second = plant();
    second.mass_flow = Some(kgps(0.4));
    let s2 = b.add_supply("S2", Position::default(), second).unwrap();
    b.add_pipe(s1, s2, pipe("p")).unwrap();
    let graph = b.build().unwrap();

    let (net, _, _) = assemble(&graph, &AssembleOptions::default()).unwrap();
    assert!(net.pumps[0].is_reference());
    assert_eq!(net.pumps[1].mode, PumpMode::FixedMassFlow { mass_flow: 0.4 });
}

#[test]
fn minor_loss_defaults_and_catalog_snap() {
    let graph = star();
    let options = AssembleOptions {
        snap_to_catalog: true,
        initial_temperature: Some(300.0),
    };
    let (net, _, _) = assemble(&graph, &options).unwrap();
    let p = &net.pipes[0];
    assert_relative_eq!(p.minor_loss, estimate_minor_loss(60.0));
    assert_relative_eq!(p.inner_diameter.value, 0.1071);
    assert_relative_eq!(p.alpha, 0.035 / ((0.250 - 0.1143) / 2.0), epsilon = 1e-9);
    assert!(p.profile().iter().all(|&t| t == 300.0));
}

#[test]
fn invalid_attributes_name_the_component() {
    let mut b = GraphBuilder::new("bad");
    let s = b.add_supply("S", Position::default(), plant()).unwrap();
    let d = b
        .add_demand("D", Position::default(), DemandAttrs::heating(dk(30.0), vec![1.0]))
        .unwrap();
    let mut bad = pipe("broken");
    bad.inner_diameter = mm(0.0);
    b.add_pipe(s, d, bad).unwrap();
    let graph = b.build().unwrap();

    match assemble(&graph, &AssembleOptions::default()) {
        Err(NetworkError::Configuration { component, reason }) => {
            assert_eq!(component, "pipe broken");
            assert!(reason.contains("inner diameter"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn inverted_plant_pressures_rejected() {
    let mut b = GraphBuilder::new("bad");
    b.add_supply(
        "S",
        Position::default(),
        SupplyAttrs::pressure_reference(bar(2.0), bar(5.0), k(353.15), k(323.15)),
    )
    .unwrap();
    let graph = b.build().unwrap();
    let err = assemble(&graph, &AssembleOptions::default()).unwrap_err();
    assert!(matches!(err, NetworkError::Configuration { .. }));
}
