//! E2E test scenarios, one module per orchestrator guarantee.

mod cancellation;
mod namespace_cleanup;
mod partition_bracket;
mod scenario_isolation;
mod setup_failure;
