//! NodeTypeSource port - lists the node types a workspace can launch.

use async_trait::async_trait;

use crate::domain::node_type::NodeTypeList;
use crate::ports::PortError;

/// Fetches the node type listing. Order of the result is unspecified.
#[async_trait]
pub trait NodeTypeSource: Send + Sync {
    async fn list_node_types(&self) -> Result<NodeTypeList, PortError>;
}
