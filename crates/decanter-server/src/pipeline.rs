use crate::config::ServerConfig;
use anyhow::Result;
use decanter_alert::checker::Checker;
use decanter_alert::store::InMemoryAlertStore;
use decanter_common::event::Event;
use decanter_common::types::COLLECT_TOPIC_PREFIX;
use decanter_notify::alerters::json::JsonLinesAlerter;
use decanter_notify::alerters::log::LogAlerter;
use decanter_notify::dispatcher::{spawn_alert_consumer, ChannelDispatcher};
use decanter_notify::AlertHandler;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;

/// The checker together with the store it owns and the task consuming its
/// alerts.
pub struct Pipeline {
    pub checker: Arc<Checker>,
    pub store: Arc<InMemoryAlertStore>,
    pub snapshot_path: PathBuf,
    consumer: JoinHandle<usize>,
}

/// Per-run intake counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IntakeStats {
    pub lines: usize,
    pub events: usize,
    pub skipped: usize,
    pub alerts: usize,
}

impl Pipeline {
    /// Builds the pipeline from `config` with the handlers the config asks
    /// for. Must run inside a tokio runtime.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let mut handlers: Vec<Box<dyn AlertHandler>> = vec![Box::new(LogAlerter)];
        if config.json_alerts {
            handlers.push(Box::new(JsonLinesAlerter::stdout()));
        }
        Self::with_handlers(config, handlers)
    }

    pub fn with_handlers(config: &ServerConfig, handlers: Vec<Box<dyn AlertHandler>>) -> Result<Self> {
        let store = Arc::new(InMemoryAlertStore::load(&config.snapshot_path)?);
        let (dispatcher, rx) = ChannelDispatcher::new();
        let consumer = spawn_alert_consumer(rx, handlers);
        let checker = Arc::new(Checker::new(
            config.checker_config(),
            store.clone(),
            Arc::new(dispatcher),
        ));

        Ok(Self {
            checker,
            store,
            snapshot_path: config.snapshot_path.clone(),
            consumer,
        })
    }

    /// Saves the snapshot, then waits for queued alerts to be handled.
    /// Returns the number of alerts the consumer handled.
    ///
    /// Every other clone of `checker` must already be dropped, otherwise the
    /// consumer keeps waiting for more alerts.
    pub async fn shutdown(self) -> Result<usize> {
        self.store.save(&self.snapshot_path)?;
        drop(self.checker);
        let consumed = self.consumer.await?;
        Ok(consumed)
    }
}

/// Parses one JSON line into a collected event. Blank lines and events
/// outside `decanter/collect/` yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Event>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let event: Event = serde_json::from_str(line)?;
    if !event.topic().starts_with(COLLECT_TOPIC_PREFIX) {
        tracing::debug!(topic = event.topic(), "Skipping event outside collect topics");
        return Ok(None);
    }
    Ok(Some(event))
}

/// Feeds JSON-lines collected events from `reader` to the checker until EOF.
/// Unparsable lines are logged and skipped.
pub async fn run_intake<R>(checker: &Checker, reader: R) -> Result<IntakeStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = IntakeStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        stats.lines += 1;
        match parse_line(&line) {
            Ok(Some(event)) => {
                stats.events += 1;
                stats.alerts += checker.handle_collected_event(&event);
            }
            Ok(None) => stats.skipped += 1,
            Err(e) => {
                stats.skipped += 1;
                tracing::warn!(line_no = stats.lines, error = %e, "Skipping unparsable event line");
            }
        }
    }

    tracing::info!(
        lines = stats.lines,
        events = stats.events,
        skipped = stats.skipped,
        alerts = stats.alerts,
        "Intake finished"
    );
    Ok(stats)
}
