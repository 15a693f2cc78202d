//! compute-core
//!
//! Decision logic and data model for a compute control plane.
//!
//! # Modules
//! - **domain**: cluster lifecycle graph, node type ranking, job definitions
//!   and task graph validation. Pure, no I/O.
//! - **ports**: traits for the remote APIs (clusters, node types, jobs) and
//!   ambient sources (clock, idempotency tokens).
//! - **app**: state polling, node type selection, job submission, and the
//!   builder wiring them together.
//! - **impls**: in-memory ports for development and tests.
//! - **config**: serde-backed configuration with defaults.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use error::ComputeError;
