use crate::event::{Event, Properties, PropertyValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic prefix that collected events are published under.
pub const COLLECT_TOPIC_PREFIX: &str = "decanter/collect/";

/// Topic prefix for alert events; the severity name is appended.
pub const ALERT_TOPIC_PREFIX: &str = "decanter/alert/";

/// Pattern text carried by a clear emitted because its rule was deleted.
pub const REMOVED_PATTERN: &str = "REMOVED";

pub const ALERT_LEVEL: &str = "alertLevel";
pub const ALERT_ATTRIBUTE: &str = "alertAttribute";
pub const ALERT_PATTERN: &str = "alertPattern";
pub const ALERT_BACK_TO_NORMAL: &str = "alertBackToNormal";

/// Alert severity. The two tiers are tracked independently.
///
/// # Examples
///
/// ```
/// use decanter_common::types::Severity;
///
/// let sev: Severity = "warn".parse().unwrap();
/// assert_eq!(sev, Severity::Warn);
/// assert_eq!(sev.to_string(), "warn");
/// assert_eq!(Severity::Error.alert_topic(), "decanter/alert/error");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
}

impl Severity {
    /// Evaluation order used by the checker.
    pub const ALL: [Severity; 2] = [Severity::Error, Severity::Warn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        }
    }

    pub fn alert_topic(&self) -> String {
        format!("{ALERT_TOPIC_PREFIX}{}", self.as_str())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warn" => Ok(Severity::Warn),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// An alert raised or cleared by the checker.
///
/// `properties` is a verbatim copy of the triggering collected event's
/// properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub id: String,
    pub topic: String,
    #[serde(rename = "alertLevel")]
    pub level: Severity,
    #[serde(rename = "alertAttribute")]
    pub attribute: String,
    #[serde(rename = "alertPattern")]
    pub pattern: String,
    #[serde(rename = "alertBackToNormal")]
    pub back_to_normal: bool,
    pub properties: Properties,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(
        level: Severity,
        attribute: impl Into<String>,
        pattern: impl Into<String>,
        back_to_normal: bool,
        source: &Event,
    ) -> Self {
        Self {
            id: crate::id::next_alert_id(),
            topic: level.alert_topic(),
            level,
            attribute: attribute.into(),
            pattern: pattern.into(),
            back_to_normal,
            properties: source.properties().clone(),
            timestamp: Utc::now(),
        }
    }

    /// Flattens the alert into a single event: the four `alert*` properties
    /// first, then every copied property. A copied property with the same name
    /// as an `alert*` key wins.
    pub fn to_event(&self) -> Event {
        let mut props = Properties::new();
        props.insert(ALERT_LEVEL, self.level.as_str());
        props.insert(ALERT_ATTRIBUTE, self.attribute.as_str());
        props.insert(ALERT_PATTERN, self.pattern.as_str());
        props.insert(ALERT_BACK_TO_NORMAL, PropertyValue::Bool(self.back_to_normal));
        for (name, value) in self.properties.iter() {
            props.insert(name, value.clone());
        }
        Event::new(self.topic.clone(), props)
    }
}
