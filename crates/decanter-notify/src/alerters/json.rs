use crate::error::Result;
use crate::AlertHandler;
use async_trait::async_trait;
use decanter_common::types::AlertEvent;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Writes each alert as one flattened JSON object per line, for a
/// downstream appender to pick up.
pub struct JsonLinesAlerter {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesAlerter {
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

/// Renders the alert as `{"id", "topic", "timestamp", "properties"}` where
/// `properties` holds the `alert*` keys followed by the copied properties.
pub fn render_line(alert: &AlertEvent) -> Result<String> {
    let line = serde_json::json!({
        "id": alert.id,
        "topic": alert.topic,
        "timestamp": alert.timestamp.to_rfc3339(),
        "properties": alert.to_event().properties(),
    });
    Ok(serde_json::to_string(&line)?)
}

#[async_trait]
impl AlertHandler for JsonLinesAlerter {
    async fn handle(&self, alert: &AlertEvent) -> Result<()> {
        let line = render_line(alert)?;
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink, "{line}")?;
        sink.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
