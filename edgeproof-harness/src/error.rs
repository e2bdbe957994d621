//! Harness-level error taxonomy and process exit codes.

use edgeproof_core::error::EdgeproofError;

/// Errors that end a harness run.
///
/// Scenario failures are not errors at this level; they are recorded in the
/// run report and mapped to an exit code by [`crate::orchestrator::RunReport::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Fixture resolution, namespace creation or partition setup failed.
    /// No scenario was run.
    #[error("setup failed: {0}")]
    Setup(String),

    /// Reconnection or namespace cleanup failed.
    #[error("teardown failed: {0}")]
    Teardown(String),

    /// A cluster API call failed.
    #[error("cluster api error: {0}")]
    Cluster(String),
}

impl HarnessError {
    /// Process exit code for this error.
    ///
    /// | code | meaning |
    /// |---|---|
    /// | 0 | all scenarios passed or skipped |
    /// | 1 | at least one scenario failed |
    /// | 2 | configuration error |
    /// | 3 | setup error |
    /// | 4 | teardown error |
    /// | 130 | run cancelled by a signal before every scenario ran |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Setup(_) | Self::Cluster(_) => EXIT_SETUP,
            Self::Teardown(_) => EXIT_TEARDOWN,
        }
    }
}

impl From<EdgeproofError> for HarnessError {
    fn from(err: EdgeproofError) -> Self {
        match err {
            EdgeproofError::Config(e) => Self::Config(e.to_string()),
            EdgeproofError::Cluster(msg) => Self::Cluster(msg),
            other => Self::Setup(other.to_string()),
        }
    }
}

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_SCENARIO_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_SETUP: i32 = 3;
pub const EXIT_TEARDOWN: i32 = 4;
/// 128 + SIGINT
pub const EXIT_CANCELLED: i32 = 130;

#[cfg(test)]
mod tests {
    use super::*;
    use edgeproof_core::error::ConfigError;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(HarnessError::Config("bad".into()).exit_code(), 2);
        assert_eq!(HarnessError::Setup("no pod ip".into()).exit_code(), 3);
        assert_eq!(HarnessError::Cluster("403".into()).exit_code(), 3);
        assert_eq!(HarnessError::Teardown("reconnect".into()).exit_code(), 4);
    }

    #[test]
    fn config_errors_stay_config_errors() {
        let err: HarnessError = EdgeproofError::Config(ConfigError::InvalidValue {
            field: "nodes.edge_node".to_owned(),
            reason: "must not be empty".to_owned(),
        })
        .into();
        assert!(matches!(err, HarnessError::Config(_)));
        assert!(err.to_string().contains("nodes.edge_node"));
    }
}
