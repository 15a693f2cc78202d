//! NodeTypeSelector - picks the default node type from the live listing.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::node_type::{NodeType, NodeTypeRequest};
use crate::ports::{NodeTypeSource, PortError};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no node type matches the request ({candidates} candidates listed)")]
    NoMatch { candidates: usize },

    #[error(transparent)]
    Port(#[from] PortError),
}

pub struct NodeTypeSelector {
    source: Arc<dyn NodeTypeSource>,
}

impl NodeTypeSelector {
    pub fn new(source: Arc<dyn NodeTypeSource>) -> Self {
        Self { source }
    }

    /// List, rank, and return the best match for `request`.
    pub async fn select(&self, request: &NodeTypeRequest) -> Result<NodeType, SelectError> {
        let mut listing = self.source.list_node_types().await?;
        listing.sort();
        let candidates = listing.node_types.len();
        debug!(candidates, "ranked node type listing");

        match listing.best(request) {
            Some(node_type) => {
                info!(
                    node_type_id = %node_type.node_type_id,
                    memory_mb = node_type.memory_mb,
                    num_cores = node_type.num_cores,
                    "selected node type"
                );
                Ok(node_type.clone())
            }
            None => {
                warn!(candidates, ?request, "no node type matches");
                Err(SelectError::NoMatch { candidates })
            }
        }
    }
}
