//! ControlPlaneBuilder - ポートと設定のワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンで必須ポートを受け取る
//! - 起動時検証（Fail-fast 設計）: ポート不足や不正な設定では
//!   [`ControlPlane`] を作らない
//! - トークン生成器は省略時に ULID 実装を使う

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::app::poller::{PollError, StatePoller};
use crate::app::selector::{NodeTypeSelector, SelectError};
use crate::app::submission::{JobSubmission, SubmitError};
use crate::config::{ConfigError, ControlPlaneConfig};
use crate::domain::cluster::{ClusterInfo, ClusterSpec};
use crate::domain::ids::{ClusterId, JobId};
use crate::domain::job::JobSettings;
use crate::domain::node_type::NodeType;
use crate::domain::state::ClusterState;
use crate::ports::{
    ClusterStateSource, IdempotencyTokenGenerator, JobSubmitter, NodeTypeSource, SystemClock,
    UlidTokenGenerator,
};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing port: {0}. Supply it on the builder before calling build().")]
    MissingPort(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Builds a [`ControlPlane`].
///
/// # Example
/// ```ignore
/// let plane = ControlPlaneBuilder::new()
///     .cluster_states(states)
///     .node_types(listing)
///     .job_submitter(jobs)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ControlPlaneBuilder {
    cluster_states: Option<Arc<dyn ClusterStateSource>>,
    node_types: Option<Arc<dyn NodeTypeSource>>,
    job_submitter: Option<Arc<dyn JobSubmitter>>,
    tokens: Option<Arc<dyn IdempotencyTokenGenerator>>,
    config: ControlPlaneConfig,
}

impl ControlPlaneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cluster_states(mut self, source: Arc<dyn ClusterStateSource>) -> Self {
        self.cluster_states = Some(source);
        self
    }

    pub fn node_types(mut self, source: Arc<dyn NodeTypeSource>) -> Self {
        self.node_types = Some(source);
        self
    }

    pub fn job_submitter(mut self, submitter: Arc<dyn JobSubmitter>) -> Self {
        self.job_submitter = Some(submitter);
        self
    }

    /// Optional. Defaults to ULID tokens stamped with the system clock.
    pub fn token_generator(mut self, tokens: Arc<dyn IdempotencyTokenGenerator>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn config(mut self, config: ControlPlaneConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// - `BuildError::MissingPort` naming the first port not supplied
    /// - `BuildError::Config` if the config fails validation
    pub fn build(self) -> Result<ControlPlane, BuildError> {
        let cluster_states = self
            .cluster_states
            .ok_or(BuildError::MissingPort("cluster_states"))?;
        let node_types = self
            .node_types
            .ok_or(BuildError::MissingPort("node_types"))?;
        let job_submitter = self
            .job_submitter
            .ok_or(BuildError::MissingPort("job_submitter"))?;
        self.config.validate()?;

        let tokens = self.tokens.unwrap_or_else(|| {
            debug!("no token generator supplied; using ULID tokens");
            Arc::new(UlidTokenGenerator::new(SystemClock))
        });

        info!(
            interval_ms = self.config.poll.interval_ms,
            timeout_ms = self.config.poll.timeout_ms,
            "control plane ready"
        );

        Ok(ControlPlane {
            poller: StatePoller::new(cluster_states, self.config.poll),
            selector: NodeTypeSelector::new(node_types),
            submission: JobSubmission::new(job_submitter),
            tokens,
            config: self.config,
        })
    }
}

/// Entry point for callers: waits on clusters, picks node types, submits
/// jobs.
pub struct ControlPlane {
    poller: StatePoller,
    selector: NodeTypeSelector,
    submission: JobSubmission,
    tokens: Arc<dyn IdempotencyTokenGenerator>,
    config: ControlPlaneConfig,
}

impl ControlPlane {
    pub fn config(&self) -> &ControlPlaneConfig {
        &self.config
    }

    pub async fn wait_for_state(
        &self,
        cluster_id: &ClusterId,
        desired: ClusterState,
    ) -> Result<ClusterInfo, PollError> {
        self.poller.wait_for_state(cluster_id, desired).await
    }

    /// Best node type for the configured request.
    pub async fn select_node_type(&self) -> Result<NodeType, SelectError> {
        self.selector.select(&self.config.node_type).await
    }

    /// Create payload for a new cluster on the selected node type, carrying
    /// a fresh idempotency token.
    pub async fn new_cluster_spec(
        &self,
        spark_version: impl Into<String>,
    ) -> Result<ClusterSpec, SelectError> {
        let node_type = self.select_node_type().await?;
        Ok(ClusterSpec::new(spark_version)
            .with_node_type(node_type.node_type_id)
            .with_idempotency_token(self.tokens.generate()))
    }

    pub async fn submit_job(&self, settings: &JobSettings) -> Result<JobId, SubmitError> {
        self.submission.submit(settings).await
    }
}
