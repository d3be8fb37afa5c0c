use anyhow::Result;
use decanter_alert::checker::Checker;
use decanter_alert::store::{AlertStore, InMemoryAlertStore};
use decanter_common::types::Severity;
use decanter_server::config::ServerConfig;
use decanter_server::pipeline::{run_intake, Pipeline};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  decanter-server [config.toml]               Check JSON-lines collected events read from stdin");
    eprintln!("  decanter-server list-alerts <config.toml>   Print alerts recorded in the snapshot file");
}

fn init_logging(default_directive: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// How long runtime shutdown waits for blocking tasks. A pending stdin read
/// never finishes on its own once intake has been abandoned.
const BLOCKING_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    run_to_completion(run(std::env::args().collect()))?
}

/// Drives `future` on a fresh runtime, then shuts the runtime down without
/// waiting indefinitely on blocking tasks such as the stdin reader.
fn run_to_completion<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(BLOCKING_SHUTDOWN_GRACE);
    Ok(output)
}

async fn run(args: Vec<String>) -> Result<()> {
    match args.get(1).map(|s| s.as_str()) {
        Some("list-alerts") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("list-alerts requires <config.toml> argument")
            })?;
            run_list_alerts(config_path)
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/decanter.toml");
            run_server(config_path).await
        }
    }
}

#[allow(clippy::print_stdout)]
fn run_list_alerts(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let store = InMemoryAlertStore::load(&config.snapshot_path)?;
    for severity in Severity::ALL {
        for identity in store.list(severity) {
            println!("{severity}\t{identity}");
        }
    }
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    init_logging(&config.log_level)?;
    decanter_common::id::init(config.id_node);

    let pipeline = Pipeline::from_config(&config)?;
    tracing::info!(
        rules = pipeline.checker.config().len(),
        snapshot = %pipeline.snapshot_path.display(),
        error_alerts = pipeline.store.len(Severity::Error),
        warn_alerts = pipeline.store.len(Severity::Warn),
        id_node = ?decanter_common::id::current_node(),
        "decanter-server starting"
    );

    let reload = spawn_config_reload(config_path.to_string(), pipeline.checker.clone());
    let checker = pipeline.checker.clone();
    let intake = run_intake(&checker, BufReader::new(tokio::io::stdin()));

    tokio::select! {
        result = intake => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Event intake failed");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    reload.abort();
    let _ = reload.await;
    drop(checker);

    let consumed = pipeline.shutdown().await?;
    tracing::info!(alerts = consumed, "decanter-server stopped");
    Ok(())
}

/// Re-reads the config file on SIGHUP and swaps the checker rules.
#[cfg(unix)]
fn spawn_config_reload(config_path: String, checker: Arc<Checker>) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "SIGHUP handler unavailable, config reload disabled");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            match ServerConfig::load(&config_path) {
                Ok(config) => checker.update_config(config.checker_config()),
                Err(e) => tracing::error!(error = %e, "Config reload failed, keeping current rules"),
            }
        }
    })
}

#[cfg(not(unix))]
fn spawn_config_reload(_config_path: String, _checker: Arc<Checker>) -> JoinHandle<()> {
    tokio::spawn(async {})
}
