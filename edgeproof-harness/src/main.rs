use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_harness::cli::HarnessCli;
use edgeproof_harness::error::EXIT_SUCCESS;
use edgeproof_harness::{HarnessError, KubeClusterClient, Orchestrator, logging, report};
use edgeproof_node_runtime::{BollardDockerClient, DockerExecutor};
use edgeproof_scenarios::{Support, all_scenarios, edge_autonomy_suite};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = HarnessCli::parse();

    let config = match cli.load_config().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("edgeproof: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }
    if cli.list {
        print_scenarios(&config);
        return Ok(());
    }

    logging::init_tracing(&config.general)?;

    let code = match run(config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "harness run aborted");
            e.exit_code()
        }
    };
    if code != EXIT_SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}

async fn run(config: EdgeproofConfig) -> Result<i32, HarnessError> {
    let docker = Arc::new(
        BollardDockerClient::connect(&config.nodes.docker_socket)
            .map_err(|e| HarnessError::Setup(format!("failed to create docker client: {e}")))?,
    );
    let cluster = Arc::new(KubeClusterClient::connect(&config.cluster.kubeconfig).await?);
    let executor = Arc::new(DockerExecutor::new(Arc::clone(&docker)));
    let report_path = config.report.json_path.clone();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let mut orchestrator = Orchestrator::builder()
        .config(config)
        .cluster(cluster)
        .docker(docker)
        .executor(executor)
        .cancellation_token(cancel)
        .build()?;

    let run_report = orchestrator.run().await?;
    report::log_summary(&run_report);

    if !report_path.is_empty() {
        if let Err(e) = report::write_json(&run_report, &report_path).await {
            tracing::error!(error = %e, "failed to write run report");
        }
    }
    Ok(run_report.exit_code())
}

/// Stops scheduling new scenarios on SIGINT/SIGTERM. The in-flight scenario
/// and the teardown still run to completion.
async fn cancel_on_signal(cancel: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "failed to install signal handlers");
            return;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    tracing::warn!(signal = name, "shutdown signal received, finishing current scenario");
    cancel.cancel();
}

fn print_scenarios(config: &EdgeproofConfig) {
    let selected: Vec<String> = edge_autonomy_suite(config)
        .into_iter()
        .map(|s| s.name)
        .collect();
    for scenario in all_scenarios(config) {
        let mark = if selected.contains(&scenario.name) { "*" } else { " " };
        let note = match &scenario.support {
            Support::Supported => String::new(),
            Support::ExpectedUnsupported { reason } => format!(" (expected unsupported: {reason})"),
        };
        println!("{mark} {:<11} {}{note}", scenario.name, scenario.description);
    }
}
