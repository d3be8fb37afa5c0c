use decanter_common::types::Severity;
use std::collections::HashMap;

/// Suffix of the key naming the property that disambiguates alert
/// identities for one event type (`{type}.alertUUID`).
pub const ALERT_UUID_SUFFIX: &str = "alertUUID";

/// Immutable snapshot of the checker's flat rule configuration.
///
/// Keys are dot-delimited:
///
/// * `{attribute}.{severity}` = pattern, applies to any event type
/// * `{type}.{attribute}.{severity}` = pattern, applies to one event type
/// * `{type}.alertUUID` = name of the event property that tells instances
///   of the same attribute apart
///
/// `severity` is `error` or `warn`. The snapshot is replaced wholesale on
/// every configuration update.
///
/// # Examples
///
/// ```
/// use decanter_alert::config::CheckerConfig;
/// use decanter_common::types::Severity;
///
/// let config = CheckerConfig::from_iter([
///     ("ThreadCount.error", "range:[0,200]"),
///     ("jmx.ThreadCount.error", "range:[0,500]"),
/// ]);
/// assert_eq!(
///     config.resolve_pattern("ThreadCount", Some("jmx"), Severity::Error),
///     Some("range:[0,200]")
/// );
/// assert_eq!(config.resolve_pattern("ThreadCount", Some("jmx"), Severity::Warn), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CheckerConfig {
    properties: HashMap<String, String>,
}

impl CheckerConfig {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Pattern for `attribute` at `severity`. The untyped key is consulted
    /// first, then the type-qualified one.
    pub fn resolve_pattern(
        &self,
        attribute: &str,
        event_type: Option<&str>,
        severity: Severity,
    ) -> Option<&str> {
        self.get(&format!("{attribute}.{severity}")).or_else(|| {
            event_type.and_then(|t| self.get(&format!("{t}.{attribute}.{severity}")))
        })
    }

    /// Name of the property disambiguating identities for `event_type`.
    pub fn alert_uuid_property(&self, event_type: &str) -> Option<&str> {
        self.get(&format!("{event_type}.{ALERT_UUID_SUFFIX}"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CheckerConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
