//! SCT command-line interface.

use anyhow::{Context, Result};
use clap::Parser;
use sct_algo::{BaselineMinimizer, FiberCostModel};
use sct_io::{load_data_space, load_fiber_config, save_greedy_cache, LocalDataStore};
use sct_schemas::{CostMinimizerConfig, FiberCostConfig, OutputSpace, SchoolConnectionCosts};
use std::fs;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod cli;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    if let Err(err) = run(cli.command) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Fiber {
            schools,
            nodes,
            config,
            workspace,
            out,
            minimize,
            years,
        } => run_fiber(
            &schools,
            &nodes,
            config.as_deref(),
            workspace.as_deref(),
            out.as_deref(),
            minimize,
            years,
        ),
    }
}

fn run_fiber(
    schools: &Path,
    nodes: &Path,
    config: Option<&Path>,
    workspace: Option<&Path>,
    out: Option<&Path>,
    minimize: bool,
    years: u32,
) -> Result<()> {
    let config = match config {
        Some(path) => load_fiber_config(path)?,
        None => FiberCostConfig::default(),
    };
    let store = LocalDataStore;
    let mut space = load_data_space(schools, nodes, workspace, &store)?;
    info!(
        schools = space.schools.len(),
        fiber_nodes = space.fiber_nodes.len(),
        cached = space.cache.len(),
        "data space loaded"
    );

    let results = FiberCostModel::new(config).run(&mut space);
    if let Some(workspace) = workspace {
        save_greedy_cache(&store, workspace, &space.cache)?;
        info!(workspace = %workspace.display(), "distance caches persisted");
    }

    let records: Vec<SchoolConnectionCosts> = if minimize {
        let mut output = OutputSpace::new();
        output.push_results(&results);
        BaselineMinimizer::new(CostMinimizerConfig { years_opex: years }).run(&output)
    } else {
        results.cost_results
    };
    write_records(&records, out)
}

fn write_records(records: &[SchoolConnectionCosts], out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("serializing cost records")?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating output directory '{}'", parent.display()))?;
            }
            fs::write(path, json)
                .with_context(|| format!("writing cost records '{}'", path.display()))?;
            info!(out = %path.display(), records = records.len(), "cost records written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_run_fiber_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let schools = write_file(
            dir.path(),
            "schools.csv",
            "school_id,lat,lon,bandwidth_demand_mbps,connected\ns-1,0.018,0.0,20.0,false\n",
        );
        let nodes = write_file(dir.path(), "nodes.csv", "node_id,lat,lon\nn-1,0.0,0.0\n");
        let out = dir.path().join("costs.json");
        let workspace = dir.path().join("ws");

        run_fiber(
            &schools,
            &nodes,
            None,
            Some(&workspace),
            Some(&out),
            false,
            5,
        )
        .unwrap();

        let records: Vec<SchoolConnectionCosts> =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].feasible);
        // Caches landed in the workspace for the next run.
        assert!(workspace.join("fiber_cache.json").is_file());
    }

    #[test]
    fn test_run_fiber_minimized_output() {
        let dir = tempfile::tempdir().unwrap();
        let schools = write_file(
            dir.path(),
            "schools.csv",
            "school_id,lat,lon,bandwidth_demand_mbps,connected\n\
             s-1,0.018,0.0,20.0,false\n\
             s-2,40.0,40.0,20.0,false\n",
        );
        let nodes = write_file(dir.path(), "nodes.csv", "node_id,lat,lon\nn-1,0.0,0.0\n");
        let out = dir.path().join("minimized.json");

        run_fiber(&schools, &nodes, None, None, Some(&out), true, 5).unwrap();

        let records: Vec<SchoolConnectionCosts> =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        // s-1 is in range; s-2 is thousands of km away and ends up "None".
        assert_eq!(records[0].technology, "Fiber");
        assert_eq!(records[1].technology, "None");
        assert_eq!(
            records[1].reason.as_deref(),
            Some("FIBER_DISTANCE_THRESHOLD")
        );
    }
}
