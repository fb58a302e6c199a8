use hn_core::units::{bar, dk, k, m, mm, w_per_m_k};
use hn_graph::{DemandAttrs, GraphBuilder, NodeRole, PipeAttrs, Position, SupplyAttrs};

fn pipe(id: &str, length: f64) -> PipeAttrs {
    PipeAttrs::new(
        id,
        m(length),
        mm(100.0),
        mm(0.025),
        mm(38.0),
        w_per_m_k(0.035),
        5,
    )
}

#[test]
fn small_street_network() {
    let mut b = GraphBuilder::new("street");
    let plant = b
        .add_supply(
            "plant",
            Position::new(0.0, 0.0),
            SupplyAttrs::pressure_reference(bar(6.0), bar(2.0), k(358.15), k(323.15)),
        )
        .unwrap();
    let j = b.add_junction("J1", Position::new(100.0, 0.0)).unwrap();
    let h1 = b
        .add_demand(
            "H1",
            Position::new(100.0, 40.0),
            DemandAttrs::heating(dk(30.0), vec![8_000.0, 9_000.0]),
        )
        .unwrap();
    let h2 = b
        .add_demand(
            "H2",
            Position::new(180.0, 0.0),
            DemandAttrs::heating(dk(25.0), vec![5_000.0, 5_500.0]).with_dhw(vec![500.0, 0.0]),
        )
        .unwrap();
    b.add_pipe(plant, j, pipe("main", 100.0)).unwrap();
    b.add_pipe(j, h1, pipe("b1", 40.0)).unwrap();
    b.add_pipe(j, h2, pipe("b2", 80.0)).unwrap();

    let graph = b.build().unwrap();
    assert_eq!(graph.name(), "street");
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.supplies().collect::<Vec<_>>(), vec![plant]);
    assert_eq!(graph.demands().count(), 2);
    assert_eq!(graph.incident(j).len(), 3);
    assert!((graph.total_length() - 220.0).abs() < 1e-9);

    let b2 = graph.find_pipe("b2").unwrap();
    assert_eq!(graph.endpoints(b2), Some((j, h2)));

    let node = graph.node(h2).unwrap();
    match &node.role {
        NodeRole::Demand(d) => assert_eq!(d.dhw, vec![500.0, 0.0]),
        other => panic!("unexpected role {}", other.kind()),
    }
    assert!(node.results.is_empty());
}

#[test]
fn results_can_be_written_back() {
    let mut b = GraphBuilder::new("wb");
    let a = b.add_junction("A", Position::default()).unwrap();
    let c = b.add_junction("C", Position::default()).unwrap();
    let e = b.add_pipe(a, c, pipe("p", 10.0)).unwrap();
    let mut graph = b.build().unwrap();

    graph.edge_mut(e).unwrap().results.supply.mass_flow = vec![0.5, 0.6];
    graph.node_mut(a).unwrap().results.supply.temperature = vec![350.0, 351.0];

    assert_eq!(graph.edge(e).unwrap().results.supply.mass_flow, vec![0.5, 0.6]);
    assert!(!graph.node(a).unwrap().results.is_empty());
}
