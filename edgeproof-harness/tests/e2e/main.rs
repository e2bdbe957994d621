//! E2E tests for the edgeproof harness.
//!
//! Drive the full orchestrator (setup, partition, scenarios, teardown) against
//! mock cluster, Docker and executor collaborators on paused tokio time.
//!
//! # Test Structure
//!
//! - `helpers/` -- Mock collaborators and shared fixtures
//! - `scenarios/` -- Tests grouped by the guarantee they check
//!
//! # Running
//!
//! ```bash
//! cargo test -p edgeproof-harness --test e2e
//! ```

mod helpers;
mod scenarios;
