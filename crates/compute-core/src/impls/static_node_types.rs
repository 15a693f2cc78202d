//! StaticNodeTypes - a fixed node type listing.

use async_trait::async_trait;

use crate::domain::node_type::{NodeType, NodeTypeList};
use crate::ports::{NodeTypeSource, PortError};

/// Returns the same listing on every call, in the order given.
#[derive(Debug, Clone, Default)]
pub struct StaticNodeTypes {
    listing: NodeTypeList,
}

impl StaticNodeTypes {
    pub fn new(node_types: Vec<NodeType>) -> Self {
        Self {
            listing: NodeTypeList::new(node_types),
        }
    }
}

impl From<NodeTypeList> for StaticNodeTypes {
    fn from(listing: NodeTypeList) -> Self {
        Self { listing }
    }
}

#[async_trait]
impl NodeTypeSource for StaticNodeTypes {
    async fn list_node_types(&self) -> Result<NodeTypeList, PortError> {
        Ok(self.listing.clone())
    }
}
