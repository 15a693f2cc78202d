//! JobSubmitter port - creates jobs on the remote side.

use async_trait::async_trait;

use crate::domain::ids::JobId;
use crate::domain::job_graph::ValidatedJob;
use crate::ports::PortError;

/// Creates a job from a definition that has already passed validation.
///
/// Only [`ValidatedJob`] is accepted, so unchecked definitions never reach
/// the remote API.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn create_job(&self, job: &ValidatedJob) -> Result<JobId, PortError>;
}
