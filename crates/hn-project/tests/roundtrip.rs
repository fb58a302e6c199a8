use hn_project::schema::*;
use hn_project::{
    ProjectError, load_network, load_simulation, save_network, save_simulation, to_context,
    to_graph,
};
use hn_results::HistoryMode;
use hn_sim::Simulation;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hn_project_{}_{name}", std::process::id()))
}

fn network() -> NetworkDef {
    let pipe = |id: &str, from: &str, to: &str, length: f64| PipeDef {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        length_m: Some(length),
        inner_diameter_m: Some(0.08),
        roughness_m: 2.5e-5,
        insulation_thickness_m: Some(0.04),
        insulation_conductivity_w_mk: Some(0.035),
        sections: 5,
        ground_depth_m: 1.0,
        minor_loss: None,
    };
    let demand = |id: &str, heat: f64| NodeDef {
        id: id.to_string(),
        x: 0.0,
        y: 0.0,
        kind: NodeKind::Demand {
            design_delta_t_k: Some(30.0),
            heat_w: Some(vec![heat; 3]),
            dhw_w: vec![1e3; 3],
            cooling_w: vec![],
        },
    };
    NetworkDef {
        name: "street".into(),
        nodes: vec![
            NodeDef {
                id: "plant".into(),
                x: 0.0,
                y: 0.0,
                kind: NodeKind::Supply {
                    p_flow_pa: Some(6e5),
                    p_return_pa: Some(2e5),
                    t_flow_k: Some(348.15),
                    t_return_k: Some(318.15),
                    mass_flow_kg_s: None,
                },
            },
            NodeDef {
                id: "J".into(),
                x: 50.0,
                y: 0.0,
                kind: NodeKind::Junction,
            },
            demand("A", 15e3),
            demand("B", 9e3),
        ],
        pipes: vec![
            pipe("main", "plant", "J", 150.0),
            pipe("a", "J", "A", 40.0),
            pipe("b", "J", "B", 70.0),
        ],
    }
}

#[test]
fn network_json_roundtrip() {
    let path = temp_path("network.json");
    let def = network();
    save_network(&path, &def).unwrap();
    let loaded = load_network(&path).unwrap();
    assert_eq!(loaded, def);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn simulation_yaml_roundtrip() {
    let path = temp_path("simulation.yaml");
    let def = SimulationDef {
        stop_time_s: 10_800.0,
        history: HistoryMode::Full,
        ground: GroundDef::ByDepth {
            series: vec![DepthSeriesDef {
                depth_m: 1.0,
                values_k: vec![281.0, 281.5, 282.0],
            }],
        },
        ..SimulationDef::default()
    };
    save_simulation(&path, &def).unwrap();
    let loaded = load_simulation(&path).unwrap();
    assert_eq!(loaded, def);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn unknown_pipe_end_fails_on_load() {
    let path = temp_path("dangling.json");
    let mut def = network();
    def.pipes[1].to = "nowhere".into();
    std::fs::write(&path, serde_json::to_string(&def).unwrap()).unwrap();
    assert!(matches!(
        load_network(&path),
        Err(ProjectError::Validation(_))
    ));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn files_drive_a_full_run() {
    let graph = to_graph(&network()).unwrap();
    let def = SimulationDef {
        stop_time_s: 10_800.0,
        demand_mode: DemandModeDef::HeatingAndDhw,
        ..SimulationDef::default()
    };
    let ctx = to_context(&def, graph.name()).unwrap();
    let recorder = Simulation::with_reference_solver(&graph, ctx)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(recorder.steps(), 12);

    let demand = &recorder
        .table(hn_results::Variable::ConsumerDemand)
        .values;
    assert_eq!(demand[0][0], 16e3);
    assert_eq!(demand[1][0], 10e3);
}
