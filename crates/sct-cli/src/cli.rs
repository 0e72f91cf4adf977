use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate fiber connectivity costs for a school table
    Fiber {
        /// Path to the school table (CSV: school_id,lat,lon,...)
        #[arg(long)]
        schools: PathBuf,

        /// Path to the fiber node table (CSV: node_id,lat,lon)
        #[arg(long)]
        nodes: PathBuf,

        /// Fiber cost configuration (YAML or JSON); defaults apply if omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Workspace directory holding the distance caches
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Write cost records to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Reduce the results to the cheapest feasible option per school
        #[arg(long)]
        minimize: bool,

        /// OpEx horizon in years used by --minimize
        #[arg(long, default_value_t = 5)]
        years: u32,
    },
}
