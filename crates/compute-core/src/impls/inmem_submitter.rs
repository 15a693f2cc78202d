//! InMemoryJobSubmitter - 開発・テスト用のジョブ送信先
//!
//! 作成されたジョブを送信せずに記録します。

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ids::JobId;
use crate::domain::job::JobSettings;
use crate::domain::job_graph::ValidatedJob;
use crate::ports::{JobSubmitter, PortError};

/// Assigns increasing job ids starting at 1 and keeps every submitted job.
///
/// Built with [`InMemoryJobSubmitter::rejecting`] it refuses every job,
/// which stands in for a remote side that rejects the request.
pub struct InMemoryJobSubmitter {
    next_id: AtomicI64,
    jobs: Mutex<Vec<(JobId, JobSettings)>>,
    reject_with: Option<String>,
}

impl InMemoryJobSubmitter {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            jobs: Mutex::new(Vec::new()),
            reject_with: None,
        }
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Jobs created so far, in submission order.
    pub fn submitted(&self) -> Vec<(JobId, JobSettings)> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for InMemoryJobSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSubmitter for InMemoryJobSubmitter {
    async fn create_job(&self, job: &ValidatedJob) -> Result<JobId, PortError> {
        if let Some(reason) = &self.reject_with {
            return Err(PortError::Rejected(reason.clone()));
        }
        let job_id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((job_id, job.settings().clone()));
        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{SparkSubmitTask, TaskKind};
    use crate::domain::job_graph::JobTaskGraph;

    fn validated(name: &str) -> ValidatedJob {
        let settings =
            JobSettings::single_task(name, TaskKind::SparkSubmit(SparkSubmitTask::default()));
        JobTaskGraph::validate(&settings).unwrap()
    }

    #[tokio::test]
    async fn ids_increase_and_jobs_are_kept() {
        let submitter = InMemoryJobSubmitter::new();
        let first = submitter.create_job(&validated("a")).await.unwrap();
        let second = submitter.create_job(&validated("b")).await.unwrap();

        assert_eq!(first, JobId(1));
        assert_eq!(second, JobId(2));
        let names: Vec<_> = submitter
            .submitted()
            .into_iter()
            .map(|(_, s)| s.name.unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn rejecting_submitter_keeps_nothing() {
        let submitter = InMemoryJobSubmitter::rejecting("quota exceeded");
        let err = submitter.create_job(&validated("a")).await.unwrap_err();
        assert_eq!(err, PortError::Rejected("quota exceeded".into()));
        assert!(submitter.submitted().is_empty());
    }
}
