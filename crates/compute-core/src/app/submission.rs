//! JobSubmission - validate a job definition, then create it.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::errors::GraphIntegrityError;
use crate::domain::ids::JobId;
use crate::domain::job::JobSettings;
use crate::domain::job_graph::JobTaskGraph;
use crate::ports::{JobSubmitter, PortError};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid job definition: {0}")]
    Invalid(#[from] GraphIntegrityError),

    #[error(transparent)]
    Port(#[from] PortError),
}

pub struct JobSubmission {
    submitter: Arc<dyn JobSubmitter>,
}

impl JobSubmission {
    pub fn new(submitter: Arc<dyn JobSubmitter>) -> Self {
        Self { submitter }
    }

    /// Create the job if it validates. An invalid job never reaches the
    /// submitter.
    pub async fn submit(&self, settings: &JobSettings) -> Result<JobId, SubmitError> {
        let job_name = settings.name.as_deref().unwrap_or_default();

        let validated = JobTaskGraph::validate(settings).inspect_err(|err| {
            warn!(job_name, error = %err, "job definition rejected");
        })?;

        let job_id = self.submitter.create_job(&validated).await?;
        info!(
            job_name,
            %job_id,
            mode = ?validated.mode(),
            tasks = validated.tasks().len(),
            "job created"
        );
        Ok(job_id)
    }
}
