#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use decanter_common::types::AlertEvent;
use decanter_notify::error::Result as NotifyResult;
use decanter_notify::AlertHandler;
use decanter_server::config::ServerConfig;
use decanter_server::pipeline::Pipeline;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub config: ServerConfig,
    pub pipeline: Pipeline,
    pub recorded: Arc<Mutex<Vec<AlertEvent>>>,
}

struct RecordingHandler(Arc<Mutex<Vec<AlertEvent>>>);

#[async_trait]
impl AlertHandler for RecordingHandler {
    async fn handle(&self, alert: &AlertEvent) -> NotifyResult<()> {
        self.0.lock().unwrap().push(alert.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Builds a pipeline whose snapshot lives in a fresh temp dir. `checker_toml`
/// is the body of the `[checker]` table.
pub fn build_test_context(checker_toml: &str) -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let snapshot = temp_dir.path().join("decanter").join("alerter.db");
    build_context_in(temp_dir, &snapshot, checker_toml)
}

pub fn build_context_in(
    temp_dir: TempDir,
    snapshot: &std::path::Path,
    checker_toml: &str,
) -> Result<TestContext> {
    let toml = format!(
        "snapshot_path = {snapshot:?}\n[checker]\n{checker_toml}\n",
        snapshot = snapshot.display().to_string()
    );
    let config = ServerConfig::parse(&toml)?;

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let handlers: Vec<Box<dyn AlertHandler>> = vec![Box::new(RecordingHandler(recorded.clone()))];
    let pipeline = Pipeline::with_handlers(&config, handlers)?;

    Ok(TestContext {
        temp_dir,
        config,
        pipeline,
        recorded,
    })
}

pub fn jmx_line(thread_count: i64) -> String {
    serde_json::json!({
        "topic": "decanter/collect/jmx",
        "properties": { "type": "jmx", "ThreadCount": thread_count }
    })
    .to_string()
}
