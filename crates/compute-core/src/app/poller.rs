//! StatePoller - waits for a cluster to reach a lifecycle state.
//!
//! # Flow
//! 1. fetch the cluster
//! 2. desired state reached: done
//! 3. desired state no longer reachable from the observed one: fail now
//! 4. deadline passed: time out
//! 5. sleep one interval (capped at the deadline) and go to 1

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::domain::cluster::ClusterInfo;
use crate::domain::ids::ClusterId;
use crate::domain::state::{ClusterLifecycle, ClusterState};
use crate::ports::{ClusterStateSource, PortError};

#[derive(Debug, Error)]
pub enum PollError {
    #[error("cluster is {current} and can no longer reach {desired}: {message}")]
    Unreachable {
        current: ClusterState,
        desired: ClusterState,
        message: String,
    },

    #[error("cluster {cluster_id} did not reach {desired} within {waited:?} (last state {last})")]
    Timeout {
        cluster_id: ClusterId,
        desired: ClusterState,
        last: ClusterState,
        waited: Duration,
    },

    #[error(transparent)]
    Port(#[from] PortError),
}

pub struct StatePoller {
    source: Arc<dyn ClusterStateSource>,
    lifecycle: ClusterLifecycle<'static>,
    poll: PollConfig,
}

impl StatePoller {
    pub fn new(source: Arc<dyn ClusterStateSource>, poll: PollConfig) -> Self {
        Self {
            source,
            lifecycle: ClusterLifecycle::standard(),
            poll,
        }
    }

    /// Poll until the cluster is in `desired`.
    ///
    /// Returns the observation that matched. A fetch error ends the wait.
    pub async fn wait_for_state(
        &self,
        cluster_id: &ClusterId,
        desired: ClusterState,
    ) -> Result<ClusterInfo, PollError> {
        let started = Instant::now();
        let deadline = started + self.poll.timeout();

        loop {
            let info = self.source.cluster_info(cluster_id).await?;
            let current = info.state;
            debug!(%cluster_id, state = %current, %desired, "observed cluster state");

            if current == desired {
                info!(%cluster_id, state = %current, "cluster reached desired state");
                return Ok(info);
            }

            if !self.lifecycle.can_reach(current, desired) {
                let message = info.state_message.clone().unwrap_or_default();
                warn!(%cluster_id, state = %current, %desired, %message, "desired state unreachable");
                return Err(PollError::Unreachable {
                    current,
                    desired,
                    message,
                });
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(%cluster_id, state = %current, %desired, "timed out waiting for cluster state");
                return Err(PollError::Timeout {
                    cluster_id: cluster_id.clone(),
                    desired,
                    last: current,
                    waited: now - started,
                });
            }

            tokio::time::sleep(self.poll.interval().min(deadline - now)).await;
        }
    }
}
