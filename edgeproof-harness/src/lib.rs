//! edgeproof harness library.
//!
//! Exposes the harness internals for integration testing.
//! In production, `edgeproof` is used as a binary (main.rs).

pub mod cli;
pub mod cluster;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod orchestrator;
pub mod report;

pub use cluster::{ClusterClient, KubeClusterClient};
pub use error::HarnessError;
pub use orchestrator::{HarnessPhase, Orchestrator, OrchestratorBuilder, RunReport};
