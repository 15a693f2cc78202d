//! App - orchestration over the ports.
//!
//! - **poller**: wait for a cluster to reach a lifecycle state
//! - **selector**: pick a node type from the live listing
//! - **submission**: validate a job, then create it
//! - **builder**: wire ports and config into a [`ControlPlane`]

pub mod builder;
pub mod poller;
pub mod selector;
pub mod submission;

pub use self::builder::{BuildError, ControlPlane, ControlPlaneBuilder};
pub use self::poller::{PollError, StatePoller};
pub use self::selector::{NodeTypeSelector, SelectError};
pub use self::submission::{JobSubmission, SubmitError};
