//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use compute_core::app::{ControlPlane, ControlPlaneBuilder};
use compute_core::config::ControlPlaneConfig;
use compute_core::domain::job::JobMode;
use compute_core::domain::node_type::NodeTypeList;
use compute_core::domain::{
    ClusterId, ClusterState, JobSettings, JobTaskGraph, ValidatedJob,
};
use compute_core::impls::{ScriptedClusterStates, StaticNodeTypes};
use compute_core::ports::{ClusterStateSource, NodeTypeSource};

use crate::cli::Command;
use crate::sources::{FileNodeTypes, PrintingJobSubmitter};

pub async fn run(command: Command, config: ControlPlaneConfig) -> Result<()> {
    match command {
        Command::ValidateJob { path } => validate_job(&path),
        Command::RankNodeTypes { path, best } => rank_node_types(&path, best, &config),
        Command::CanReach { from, to } => {
            println!("{}", from.can_reach(to));
            Ok(())
        }
        Command::Wait {
            states,
            cluster_id,
            desired,
        } => wait(&states, ClusterId::new(cluster_id), desired, config).await,
        Command::SubmitJob { path } => submit_job(&path, config).await,
        Command::NewCluster {
            node_types,
            spark_version,
        } => new_cluster(&node_types, spark_version, config).await,
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ControlPlaneConfig> {
    let Some(path) = path else {
        return Ok(ControlPlaneConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    ControlPlaneConfig::from_json_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {what} {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {what} {}", path.display()))
}

#[derive(Debug, Serialize)]
struct TaskSummary<'a> {
    key: &'a str,
    kind: &'static str,
    depends_on: &'a [String],
}

#[derive(Debug, Serialize)]
struct JobSummary<'a> {
    name: Option<&'a str>,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    legacy_task: Option<&'static str>,
    tasks: Vec<TaskSummary<'a>>,
    roots: Vec<&'a str>,
    execution_order: Vec<&'a str>,
}

impl<'a> JobSummary<'a> {
    fn of(job: &'a ValidatedJob) -> Self {
        Self {
            name: job.name(),
            mode: match job.mode() {
                JobMode::Legacy => "legacy",
                JobMode::MultiTask => "multi_task",
            },
            legacy_task: job.legacy_task().map(|k| k.field_name()),
            tasks: job
                .tasks()
                .iter()
                .map(|t| TaskSummary {
                    key: t.key(),
                    kind: t.kind().field_name(),
                    depends_on: t.depends_on(),
                })
                .collect(),
            roots: job.roots(),
            execution_order: job.execution_order(),
        }
    }
}

fn validate_job(path: &Path) -> Result<()> {
    let settings: JobSettings = read_json(path, "job")?;
    let validated = JobTaskGraph::validate(&settings)
        .with_context(|| format!("job {} is invalid", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&JobSummary::of(&validated))?);
    Ok(())
}

fn rank_node_types(path: &Path, best: bool, config: &ControlPlaneConfig) -> Result<()> {
    let mut listing: NodeTypeList = read_json(path, "node type listing")?;
    listing.sort();

    if best {
        let Some(node_type) = listing.best(&config.node_type) else {
            bail!(
                "no node type in {} matches the configured request",
                path.display()
            );
        };
        println!("{}", node_type.node_type_id);
        return Ok(());
    }

    for nt in &listing.node_types {
        println!(
            "{}\t{} MB\t{} cores\t{} gpus{}",
            nt.node_type_id,
            nt.memory_mb,
            nt.num_cores,
            nt.num_gpus,
            if nt.is_deprecated { "\tdeprecated" } else { "" }
        );
    }
    Ok(())
}

fn control_plane(
    cluster_states: Arc<dyn ClusterStateSource>,
    node_types: Arc<dyn NodeTypeSource>,
    config: ControlPlaneConfig,
) -> Result<ControlPlane> {
    ControlPlaneBuilder::new()
        .cluster_states(cluster_states)
        .node_types(node_types)
        .job_submitter(Arc::new(PrintingJobSubmitter::new()))
        .config(config)
        .build()
        .context("wiring control plane")
}

async fn wait(
    states_path: &Path,
    cluster_id: ClusterId,
    desired: ClusterState,
    config: ControlPlaneConfig,
) -> Result<()> {
    let states: Vec<ClusterState> = read_json(states_path, "state script")?;
    if states.is_empty() {
        bail!("state script {} is empty", states_path.display());
    }
    let source = ScriptedClusterStates::new().with_states(cluster_id.clone(), states);
    let plane = control_plane(
        Arc::new(source),
        Arc::new(StaticNodeTypes::default()),
        config,
    )?;

    let info = plane
        .wait_for_state(&cluster_id, desired)
        .await
        .with_context(|| format!("waiting for {cluster_id} to become {desired}"))?;
    println!("{}", info.state);
    Ok(())
}

async fn submit_job(path: &Path, config: ControlPlaneConfig) -> Result<()> {
    let settings: JobSettings = read_json(path, "job")?;
    let plane = control_plane(
        Arc::new(ScriptedClusterStates::new()),
        Arc::new(StaticNodeTypes::default()),
        config,
    )?;
    let job_id = plane
        .submit_job(&settings)
        .await
        .with_context(|| format!("submitting job {}", path.display()))?;
    info!(%job_id, "job accepted");
    Ok(())
}

async fn new_cluster(
    listing_path: &Path,
    spark_version: String,
    config: ControlPlaneConfig,
) -> Result<()> {
    let plane = control_plane(
        Arc::new(ScriptedClusterStates::new()),
        Arc::new(FileNodeTypes::new(listing_path)),
        config,
    )?;
    let spec = plane
        .new_cluster_spec(spark_version)
        .await
        .context("selecting node type")?;
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}
