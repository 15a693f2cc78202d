//! File-backed and printing port implementations used by the CLI.

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use compute_core::domain::JobId;
use compute_core::domain::ValidatedJob;
use compute_core::domain::node_type::NodeTypeList;
use compute_core::ports::{JobSubmitter, NodeTypeSource, PortError};

/// Reads the node type listing from a JSON file on every call.
pub struct FileNodeTypes {
    path: PathBuf,
}

impl FileNodeTypes {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NodeTypeSource for FileNodeTypes {
    async fn list_node_types(&self) -> Result<NodeTypeList, PortError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PortError::NotFound,
                _ => PortError::Transport(format!("{}: {e}", self.path.display())),
            })?;
        serde_json::from_str(&raw)
            .map_err(|e| PortError::Rejected(format!("{}: {e}", self.path.display())))
    }
}

/// Prints the create request to stdout instead of sending it.
///
/// Job ids count up from 1 per process.
pub struct PrintingJobSubmitter {
    next_id: AtomicI64,
}

impl PrintingJobSubmitter {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for PrintingJobSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSubmitter for PrintingJobSubmitter {
    async fn create_job(&self, job: &ValidatedJob) -> Result<JobId, PortError> {
        let body = serde_json::to_string_pretty(job.settings())
            .map_err(|e| PortError::Rejected(e.to_string()))?;
        println!("{body}");
        Ok(JobId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_listing_file_is_not_found() {
        let source = FileNodeTypes::new("/nonexistent/listing.json");
        assert_eq!(
            source.list_node_types().await.unwrap_err(),
            PortError::NotFound
        );
    }
}
