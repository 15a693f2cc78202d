//! Domain model: cluster lifecycle, node types, jobs and their task graph.
//!
//! Pure data and decisions. Nothing here performs I/O or logs.

pub mod cluster;
pub mod errors;
pub mod ids;
pub mod job;
pub mod job_graph;
pub mod node_type;
pub mod state;

pub use cluster::{ClusterEvent, ClusterEventType, ClusterInfo, ClusterSpec, Library};
pub use errors::{GraphIntegrityError, PayloadError};
pub use ids::{ClusterId, IdempotencyToken, InstancePoolId, JobId, PipelineId, PolicyId};
pub use job::{
    JobFormat, JobMode, JobSettings, JobTask, TaskDependency, TaskKind, TaskPayloadFields,
};
pub use job_graph::{JobTaskGraph, ValidatedJob, ValidatedTask};
pub use node_type::{NodeType, NodeTypeList, NodeTypeRequest, rank};
pub use state::{ClusterLifecycle, ClusterState, ParseStateError, StateGraph};
