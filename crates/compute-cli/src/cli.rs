//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use compute_core::domain::ClusterState;

/// Command-line arguments for `compute`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "compute",
    version,
    about = "Offline checks and demos for the compute control plane.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a JSON config file. Defaults apply when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COMPUTE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a job definition (JSON) and print its task graph.
    ValidateJob {
        #[arg(value_name = "JOB_JSON")]
        path: PathBuf,
    },

    /// Sort a node type listing (JSON) and print it in ranked order.
    RankNodeTypes {
        #[arg(value_name = "LISTING_JSON")]
        path: PathBuf,

        /// Print only the best match for the configured node type request.
        #[arg(long)]
        best: bool,
    },

    /// Check whether one cluster state can lead to another.
    CanReach {
        from: ClusterState,
        to: ClusterState,
    },

    /// Wait for a cluster to reach a state, replaying observed states from a
    /// JSON array (e.g. `["PENDING", "RUNNING"]`).
    Wait {
        #[arg(long, value_name = "STATES_JSON")]
        states: PathBuf,

        #[arg(long, default_value = "demo-cluster")]
        cluster_id: String,

        desired: ClusterState,
    },

    /// Validate a job and print the create request instead of sending it.
    SubmitJob {
        #[arg(value_name = "JOB_JSON")]
        path: PathBuf,
    },

    /// Build a cluster create request on the best node type from a listing.
    NewCluster {
        #[arg(long, value_name = "LISTING_JSON")]
        node_types: PathBuf,

        #[arg(long)]
        spark_version: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
