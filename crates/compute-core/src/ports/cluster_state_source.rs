//! ClusterStateSource port - reads the current state of a cluster.

use async_trait::async_trait;

use crate::domain::cluster::ClusterInfo;
use crate::domain::ids::ClusterId;
use crate::ports::PortError;

/// Fetches cluster descriptions from the clusters API.
///
/// One call is one observation; polling and waiting live in the app layer.
#[async_trait]
pub trait ClusterStateSource: Send + Sync {
    async fn cluster_info(&self, cluster_id: &ClusterId) -> Result<ClusterInfo, PortError>;
}
