//! Ports - contracts for the systems the control plane talks to.
//!
//! Each trait hides one remote collaborator (the clusters API, the node type
//! listing, the jobs API) or an ambient source (time, token generation), so
//! the app layer can be driven by in-memory implementations in tests.

pub mod clock;
pub mod cluster_state_source;
pub mod id_generator;
pub mod job_submitter;
pub mod node_type_source;

use thiserror::Error;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::cluster_state_source::ClusterStateSource;
pub use self::id_generator::{IdempotencyTokenGenerator, UlidTokenGenerator};
pub use self::job_submitter::JobSubmitter;
pub use self::node_type_source::NodeTypeSource;

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("resource not found")]
    NotFound,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by remote: {0}")]
    Rejected(String),
}
