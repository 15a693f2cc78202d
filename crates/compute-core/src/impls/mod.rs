//! In-memory port implementations for development and tests.

pub mod inmem_submitter;
pub mod scripted_states;
pub mod static_node_types;

pub use self::inmem_submitter::InMemoryJobSubmitter;
pub use self::scripted_states::ScriptedClusterStates;
pub use self::static_node_types::StaticNodeTypes;
