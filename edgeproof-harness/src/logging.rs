//! Logging initialization for the edgeproof harness.
//!
//! `general.log_level` applies to the harness crates only. Kubernetes, HTTP and
//! Docker client crates stay at `warn` so a `debug` run shows poll attempts
//! rather than connection pool chatter. A non-empty `RUST_LOG` replaces the
//! computed filter entirely.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use edgeproof_core::config::GeneralConfig;

/// Level for every target outside the harness.
const DEPENDENCY_LEVEL: &str = "warn";

/// Tracing targets owned by the harness (binary and library crates).
const HARNESS_TARGETS: [&str; 5] = [
    "edgeproof",
    "edgeproof_harness",
    "edgeproof_core",
    "edgeproof_node_runtime",
    "edgeproof_scenarios",
];

/// Builds the `EnvFilter` directive string.
///
/// `rust_log` wins when it is set and non-blank.
pub fn filter_directive(log_level: &str, rust_log: Option<&str>) -> String {
    if let Some(directive) = rust_log.map(str::trim).filter(|d| !d.is_empty()) {
        return directive.to_owned();
    }
    let mut directive = DEPENDENCY_LEVEL.to_owned();
    for target in HARNESS_TARGETS {
        directive.push_str(&format!(",{target}={log_level}"));
    }
    directive
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - one JSON object per line, for CI log collection
/// * `"pretty"` - multi-line human-readable output
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let json = match config.log_format.as_str() {
        "json" => true,
        "pretty" => false,
        other => anyhow::bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(&config.log_level, rust_log.as_deref());
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{directive}'"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().pretty()))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    tracing::debug!(
        filter = directive.as_str(),
        from_env = rust_log.is_some(),
        format = config.log_format.as_str(),
        "tracing initialized"
    );
    Ok(())
}
