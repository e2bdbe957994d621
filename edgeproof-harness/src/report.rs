//! Run report output.

use std::path::Path;

use tracing::{error, info, warn};

use edgeproof_scenarios::ScenarioOutcome;

use crate::error::HarnessError;
use crate::orchestrator::RunReport;

/// Writes the report as pretty-printed JSON.
pub async fn write_json(report: &RunReport, path: impl AsRef<Path>) -> Result<(), HarnessError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| HarnessError::Teardown(format!("failed to serialize report: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                HarnessError::Teardown(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
    }
    tokio::fs::write(path, json)
        .await
        .map_err(|e| HarnessError::Teardown(format!("failed to write {}: {e}", path.display())))?;

    info!(path = %path.display(), "run report written");
    Ok(())
}

/// Logs one line per scenario plus teardown problems.
pub fn log_summary(report: &RunReport) {
    for scenario in &report.scenarios {
        match &scenario.outcome {
            ScenarioOutcome::Passed => info!(
                scenario = scenario.name.as_str(),
                elapsed_ms = scenario.elapsed_ms,
                "PASSED"
            ),
            ScenarioOutcome::Failed { step, reason, detail } => error!(
                scenario = scenario.name.as_str(),
                step = step.as_str(),
                reason = reason.as_str(),
                detail = detail.as_str(),
                "FAILED"
            ),
            ScenarioOutcome::Skipped { reason } => warn!(
                scenario = scenario.name.as_str(),
                reason = reason.as_str(),
                "SKIPPED"
            ),
        }
    }
    for teardown in &report.teardown_errors {
        error!(error = teardown.as_str(), "teardown error");
    }
    if report.cancelled {
        warn!("run was cancelled, suite incomplete");
    }
}
