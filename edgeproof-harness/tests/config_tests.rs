//! Configuration precedence tests: file < environment < command line.

use std::io::Write;

use clap::Parser;
use serial_test::serial;

use edgeproof_harness::HarnessError;
use edgeproof_harness::cli::HarnessCli;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

fn cli(args: &[&str]) -> HarnessCli {
    let mut argv = vec!["edgeproof"];
    argv.extend_from_slice(args);
    HarnessCli::parse_from(argv)
}

/// Runs `f` with the env var set, restoring afterwards.
async fn with_env<F, Fut, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    // SAFETY: tests touching the environment are #[serial].
    unsafe { std::env::set_var(key, value) };
    let out = f().await;
    unsafe { std::env::remove_var(key) };
    out
}

#[tokio::test]
#[serial]
async fn env_overrides_file() {
    let file = write_config("[general]\nlog_level = \"warn\"\n");
    let path = file.path().to_string_lossy().into_owned();

    let config = with_env("EDGEPROOF_GENERAL_LOG_LEVEL", "debug", move || async move {
        cli(&["--config", path.as_str()]).load_config().await
    })
    .await
    .expect("config should load");

    assert_eq!(config.general.log_level, "debug");
}

#[tokio::test]
#[serial]
async fn cli_overrides_env() {
    let file = write_config("[general]\nlog_level = \"warn\"\n");
    let path = file.path().to_string_lossy().into_owned();

    let config = with_env("EDGEPROOF_GENERAL_LOG_LEVEL", "debug", move || async move {
        cli(&["--config", path.as_str(), "--log-level", "trace"])
            .load_config()
            .await
    })
    .await
    .expect("config should load");

    assert_eq!(config.general.log_level, "trace");
}

#[tokio::test]
#[serial]
async fn env_scenario_filter_is_validated() {
    let file = write_config("");
    let path = file.path().to_string_lossy().into_owned();

    let result = with_env("EDGEPROOF_SCENARIOS_SKIP", "kubelet,etcd", move || async move {
        cli(&["--config", path.as_str()]).load_config().await
    })
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));
    assert!(err.to_string().contains("etcd"));
}

#[tokio::test]
#[serial]
async fn unparseable_file_exits_with_config_code() {
    let file = write_config("[poll\ndefault_timeout_secs = ");
    let path = file.path().to_string_lossy().into_owned();

    let err = cli(&["--config", path.as_str()]).load_config().await.unwrap_err();

    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial]
async fn example_config_loads_with_cli_filters() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../edgeproof.toml.example");

    let config = cli(&["--config", path, "--only", "kubelet,kube-proxy", "--run-unsupported"])
        .load_config()
        .await
        .expect("example config should be valid");

    assert!(config.scenarios.is_selected("kube-proxy"));
    assert!(!config.scenarios.is_selected("flannel"));
    assert!(config.scenarios.run_unsupported);
}
