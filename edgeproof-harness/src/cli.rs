//! CLI argument definitions for the edgeproof harness.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! Every flag overrides the config file and environment variables.

use std::path::{Path, PathBuf};

use clap::Parser;

use edgeproof_core::config::EdgeproofConfig;

use crate::error::HarnessError;

/// Edge autonomy verification harness.
///
/// Partitions the cloud node from the edge fabric, checks that kubelet,
/// flannel, yurthub, kube-proxy and coredns keep serving from local state,
/// then reconnects and cleans up.
#[derive(Parser, Debug)]
#[command(name = "edgeproof")]
#[command(version, about, long_about = None)]
pub struct HarnessCli {
    /// Path to edgeproof.toml configuration file.
    ///
    /// A missing file is only an error when the flag is given explicitly.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Run only the named scenarios (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip the named scenarios (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run scenarios marked as expected-unsupported.
    #[arg(long)]
    pub run_unsupported: bool,

    /// Write the JSON run report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Validate configuration and exit without touching the cluster.
    #[arg(long)]
    pub validate: bool,

    /// List the selected scenarios and exit.
    #[arg(long)]
    pub list: bool,
}

/// Config file used when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "edgeproof.toml";

impl HarnessCli {
    /// Loads the configuration, applies env and CLI overrides, then validates.
    ///
    /// Without `--config`, `edgeproof.toml` in the working directory is used when
    /// present and built-in defaults otherwise.
    pub async fn load_config(&self) -> Result<EdgeproofConfig, HarnessError> {
        let mut config = match &self.config {
            Some(path) => EdgeproofConfig::from_file(path).await?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                EdgeproofConfig::from_file(DEFAULT_CONFIG_PATH).await?
            }
            None => EdgeproofConfig::default(),
        };
        config.apply_env_overrides();
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Applies CLI overrides on top of a loaded configuration.
    ///
    /// The result still needs `validate()`.
    pub fn apply_to(&self, config: &mut EdgeproofConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if !self.only.is_empty() {
            config.scenarios.only = self.only.clone();
        }
        if !self.skip.is_empty() {
            config.scenarios.skip = self.skip.clone();
        }
        if self.run_unsupported {
            config.scenarios.run_unsupported = true;
        }
        if let Some(path) = &self.report {
            config.report.json_path = path.to_string_lossy().into_owned();
        }
    }
}
