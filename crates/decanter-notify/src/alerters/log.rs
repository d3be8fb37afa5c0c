use crate::error::Result;
use crate::AlertHandler;
use async_trait::async_trait;
use decanter_common::types::{AlertEvent, Severity};

/// Writes alerts to the tracing log at the alert's own level.
///
/// Raised alerts log at `error`/`warn`, back-to-normal transitions at
/// `info`, followed by a details line listing every property.
pub struct LogAlerter;

/// `name:value | ` for every property of the flattened alert event.
pub fn render_details(alert: &AlertEvent) -> String {
    let event = alert.to_event();
    let mut details = String::new();
    for (name, value) in event.properties().iter() {
        details.push_str(name);
        details.push(':');
        details.push_str(&value.to_string());
        details.push_str(" | ");
    }
    details
}

#[async_trait]
impl AlertHandler for LogAlerter {
    async fn handle(&self, alert: &AlertEvent) -> Result<()> {
        let details = render_details(alert);
        let attribute = alert.attribute.as_str();
        let pattern = alert.pattern.as_str();

        if alert.back_to_normal {
            tracing::info!(attribute, pattern, "DECANTER ALERT BACK TO NORMAL: was out of pattern");
        }
        match (alert.level, alert.back_to_normal) {
            (Severity::Error, false) => {
                tracing::error!(attribute, pattern, "DECANTER ALERT: out of pattern");
            }
            (Severity::Warn, false) => {
                tracing::warn!(attribute, pattern, "DECANTER ALERT: out of pattern");
            }
            _ => {}
        }
        match alert.level {
            Severity::Error => tracing::error!(details = %details, "DECANTER ALERT: Details"),
            Severity::Warn => tracing::warn!(details = %details, "DECANTER ALERT: Details"),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
