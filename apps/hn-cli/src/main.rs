use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use hn_network::{AssembleOptions, NetworkError, assemble};
use hn_project::{ProjectError, SimulationDef};
use hn_results::{ResultsError, RunManifest, RunStore, Variable, compute_run_id};
use hn_sim::{SimError, SimProgress, Simulation, write_back};
use tracing::{error, info};

const SOLVER_VERSION: &str = concat!("hn-sim ", env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "heatnet CLI - district heating transient simulation", long_about = None)]
struct Cli {
    /// Directory holding cached runs
    #[arg(long, global = true, default_value = ".heatnet/runs")]
    runs_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a network file (and optionally a simulation file)
    Validate {
        /// Path to the network JSON file
        network_path: PathBuf,
        /// Path to the simulation YAML file
        simulation_path: Option<PathBuf>,
    },
    /// Run a transient simulation
    Run {
        /// Path to the network JSON file
        network_path: PathBuf,
        /// Path to the simulation YAML file (defaults apply when omitted)
        simulation_path: Option<PathBuf>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs
    Runs,
    /// Show details of a cached run
    ShowRun {
        /// Run ID to display
        run_id: String,
    },
    /// Export one column of a recorded variable
    ExportSeries {
        /// Run ID
        run_id: String,
        /// Variable key (e.g. junction_temperature, pipe_mass_flow)
        variable: String,
        /// Column name (e.g. supply.house1, return.p12)
        column: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a cached run
    DeleteRun {
        run_id: String,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Simulation(#[from] SimError),

    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown variable '{key}'")]
    UnknownVariable { key: String },

    #[error("Variable '{variable}' has no column '{column}'")]
    UnknownColumn { variable: String, column: String },
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate {
            network_path,
            simulation_path,
        } => cmd_validate(&network_path, simulation_path.as_deref()),
        Commands::Run {
            network_path,
            simulation_path,
            no_cache,
        } => cmd_run(
            &cli.runs_dir,
            &network_path,
            simulation_path.as_deref(),
            !no_cache,
        ),
        Commands::Runs => cmd_runs(&cli.runs_dir),
        Commands::ShowRun { run_id } => cmd_show_run(&cli.runs_dir, &run_id),
        Commands::ExportSeries {
            run_id,
            variable,
            column,
            output,
        } => cmd_export_series(&cli.runs_dir, &run_id, &variable, &column, output.as_deref()),
        Commands::DeleteRun { run_id } => cmd_delete_run(&cli.runs_dir, &run_id),
    };
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}

fn load_simulation(path: Option<&Path>) -> CliResult<SimulationDef> {
    Ok(match path {
        Some(path) => hn_project::load_simulation(path)?,
        None => SimulationDef::default(),
    })
}

fn cmd_validate(network_path: &Path, simulation_path: Option<&Path>) -> CliResult<()> {
    println!("Validating network: {}", network_path.display());
    let def = hn_project::load_network(network_path)?;
    let graph = hn_project::to_graph(&def)?;
    let (network, _, _) = assemble(&graph, &AssembleOptions::default())?;
    println!(
        "✓ Network is valid ({} nodes, {} pipes, {} plants, {} consumers)",
        graph.node_count(),
        graph.edge_count(),
        network.pumps.len(),
        network.consumers.len()
    );

    if let Some(path) = simulation_path {
        println!("Validating simulation: {}", path.display());
        let sim = hn_project::load_simulation(path)?;
        let ctx = hn_project::to_context(&sim, graph.name())?;
        println!(
            "✓ Simulation is valid ({} steps, {} demand samples)",
            ctx.config.steps(),
            ctx.config.samples()
        );
    }
    Ok(())
}

fn cmd_run(
    runs_dir: &Path,
    network_path: &Path,
    simulation_path: Option<&Path>,
    use_cache: bool,
) -> CliResult<()> {
    let def = hn_project::load_network(network_path)?;
    let sim_def = load_simulation(simulation_path)?;
    let run_id = compute_run_id(
        &serde_json::to_string(&def)?,
        &serde_json::to_string(&sim_def)?,
        SOLVER_VERSION,
    );

    let store = RunStore::new(runs_dir.to_path_buf())?;
    if use_cache && store.has_run(&run_id) {
        println!("✓ Loaded from cache: {}", run_id);
        return Ok(());
    }

    println!("Running transient simulation for network: {}", def.name);
    let mut graph = hn_project::to_graph(&def)?;
    let ctx = hn_project::to_context(&sim_def, &def.name)?;
    println!(
        "  dt = {:.1} s, stop = {:.1} s, {} steps",
        ctx.config.timestep,
        ctx.config.stop_time,
        ctx.config.steps()
    );

    let started = Instant::now();
    let mut simulation = Simulation::with_reference_solver(&graph, ctx)?;
    let mut last_emit = Instant::now();
    simulation.run_to_end(|progress| {
        if last_emit.elapsed().as_millis() >= 100 || progress.step == progress.total {
            render_progress(&progress, started.elapsed().as_secs_f64());
            last_emit = Instant::now();
        }
    })?;
    clear_progress_line();
    let solve_time = started.elapsed().as_secs_f64();

    let config = &simulation.context().config;
    let manifest = RunManifest::now(
        run_id.clone(),
        def.name.clone(),
        SOLVER_VERSION,
        config.timestep,
        config.stop_time,
        simulation.current_step(),
        config.history,
    );
    store.save_run(&manifest, simulation.recorder())?;
    info!(run_id = %run_id, "run saved");

    let stats = simulation.stats();
    println!("✓ Simulation completed: {}", run_id);
    println!("\nSummary:");
    println!("  Steps:             {}", simulation.current_step());
    println!("  Hydraulic solves:  {}", stats.hydraulic_solves);
    println!("  Solver retries:    {}", stats.solver_retries);
    println!("  Reorientations:    {}", stats.reorientations);
    println!("  Thermal fallbacks: {}", stats.thermal_fallbacks);
    println!("  Solve time:        {:.3}s", solve_time);

    write_back(&mut graph, simulation.maps(), simulation.recorder())?;
    println!("\nFinal temperatures (supply / return, K):");
    for idx in graph.node_indices() {
        if let Some(node) = graph.node(idx) {
            let supply = node.results.supply.temperature.last().copied();
            let ret = node.results.ret.temperature.last().copied();
            if let (Some(s), Some(r)) = (supply, ret) {
                println!("  {:<24} {:>8.2} / {:>8.2}", node.name, s, r);
            }
        }
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_progress(progress: &SimProgress, elapsed_s: f64) {
    let fraction = if progress.total == 0 {
        1.0
    } else {
        progress.step as f64 / progress.total as f64
    };
    let width = 28usize;
    let filled = ((fraction * width as f64).round() as usize).min(width);
    print!(
        "\r[{}{}] {:>6.2}%  t={:.0}s  step={}/{}  elapsed={:.1}s",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0,
        progress.time_s,
        progress.step,
        progress.total,
        elapsed_s
    );
    let _ = io::stdout().flush();
}

fn cmd_runs(runs_dir: &Path) -> CliResult<()> {
    let store = RunStore::new(runs_dir.to_path_buf())?;
    let runs = store.list_runs()?;
    if runs.is_empty() {
        println!("No cached runs in {}", runs_dir.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} {} ({}, {} steps)",
                manifest.run_id, manifest.network, manifest.timestamp, manifest.steps
            );
        }
    }
    Ok(())
}

fn cmd_show_run(runs_dir: &Path, run_id: &str) -> CliResult<()> {
    let store = RunStore::new(runs_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;

    println!("Run {}", manifest.run_id);
    println!("  Network:   {}", manifest.network);
    println!("  Created:   {}", manifest.timestamp);
    println!("  Solver:    {}", manifest.solver_version);
    println!(
        "  Steps:     {} x {:.1} s (stop {:.1} s)",
        manifest.steps, manifest.timestep_s, manifest.stop_time_s
    );
    println!("  History:   {:?}", manifest.history);

    println!("\nVariables:");
    for variable in &manifest.variables {
        let table = store.load_table(run_id, *variable)?;
        println!(
            "  {:<28} [{}] {} columns",
            variable.key(),
            variable.unit(),
            table.columns.len()
        );
    }
    Ok(())
}

fn cmd_export_series(
    runs_dir: &Path,
    run_id: &str,
    variable: &str,
    column: &str,
    output: Option<&Path>,
) -> CliResult<()> {
    let store = RunStore::new(runs_dir.to_path_buf())?;
    let var = Variable::parse(variable).ok_or_else(|| CliError::UnknownVariable {
        key: variable.to_string(),
    })?;
    let table = store.load_table(run_id, var)?;
    let values = table
        .column(column)
        .ok_or_else(|| CliError::UnknownColumn {
            variable: variable.to_string(),
            column: column.to_string(),
        })?;

    if let Some(path) = output {
        let file = std::fs::File::create(path)?;
        write_series(file, column, &table.time, values)?;
        println!("✓ Exported {} data points to {}", values.len(), path.display());
    } else {
        write_series(io::stdout().lock(), column, &table.time, values)?;
    }
    Ok(())
}

/// Two-column CSV of one recorded series.
fn write_series<W: Write>(out: W, column: &str, time: &[f64], values: &[f64]) -> CliResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["time_s", column])?;
    for (t, v) in time.iter().zip(values) {
        writer.write_record([t.to_string(), v.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn cmd_delete_run(runs_dir: &Path, run_id: &str) -> CliResult<()> {
    let store = RunStore::new(runs_dir.to_path_buf())?;
    store.delete_run(run_id)?;
    println!("✓ Deleted run {}", run_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_export_quotes_awkward_column_names() {
        let mut out = Vec::new();
        write_series(&mut out, "H1, north", &[900.0, 1800.0], &[0.5, 0.25]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["time_s,\"H1, north\"", "900,0.5", "1800,0.25"]);
    }
}
