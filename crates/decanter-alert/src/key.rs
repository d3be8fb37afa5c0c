use crate::config::CheckerConfig;
use decanter_common::event::Event;

/// Identity under which one attribute's alert lifecycle is tracked.
///
/// Without an event type the identity is the attribute name. With one it is
/// `{type}-{attribute}`, followed by `-{value}` when `{type}.alertUUID`
/// names a disambiguating property. If that property is missing from the
/// event the suffix is the literal `null`, so every such event shares one
/// identity.
///
/// # Examples
///
/// ```
/// use decanter_alert::config::CheckerConfig;
/// use decanter_alert::key::build_identity;
/// use decanter_common::event::Event;
///
/// let config = CheckerConfig::from_iter([("cpu.alertUUID", "host")]);
/// let event = Event::builder("decanter/collect/cpu")
///     .property("type", "cpu")
///     .property("host", "A")
///     .build();
/// assert_eq!(build_identity(Some("cpu"), "usage", &event, &config), "cpu-usage-A");
/// assert_eq!(build_identity(None, "usage", &event, &config), "usage");
/// ```
pub fn build_identity(
    event_type: Option<&str>,
    attribute: &str,
    event: &Event,
    config: &CheckerConfig,
) -> String {
    let Some(event_type) = event_type else {
        return attribute.to_string();
    };

    let mut identity = format!("{event_type}-{attribute}");
    if let Some(uuid_property) = config.alert_uuid_property(event_type) {
        identity.push('-');
        match event.property(uuid_property) {
            Some(value) => identity.push_str(&value.to_string()),
            None => identity.push_str("null"),
        }
    }
    identity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_event(host: Option<&str>) -> Event {
        let mut builder = Event::builder("decanter/collect/cpu")
            .property("type", "cpu")
            .property("usage", 42_i64);
        if let Some(host) = host {
            builder = builder.property("host", host);
        }
        builder.build()
    }

    #[test]
    fn typed_identity_without_uuid_config() {
        let config = CheckerConfig::default();
        assert_eq!(
            build_identity(Some("cpu"), "usage", &cpu_event(Some("A")), &config),
            "cpu-usage"
        );
    }

    #[test]
    fn disambiguator_separates_hosts() {
        let config = CheckerConfig::from_iter([("cpu.alertUUID", "host")]);
        let a = build_identity(Some("cpu"), "usage", &cpu_event(Some("A")), &config);
        let b = build_identity(Some("cpu"), "usage", &cpu_event(Some("B")), &config);
        assert_eq!(a, "cpu-usage-A");
        assert_eq!(b, "cpu-usage-B");
    }

    #[test]
    fn missing_disambiguator_yields_null_suffix() {
        let config = CheckerConfig::from_iter([("cpu.alertUUID", "host")]);
        assert_eq!(
            build_identity(Some("cpu"), "usage", &cpu_event(None), &config),
            "cpu-usage-null"
        );
    }

    #[test]
    fn numeric_disambiguator_is_stringified() {
        let config = CheckerConfig::from_iter([("cpu.alertUUID", "pid")]);
        let event = Event::builder("decanter/collect/cpu")
            .property("type", "cpu")
            .property("pid", 4242_i64)
            .build();
        assert_eq!(build_identity(Some("cpu"), "usage", &event, &config), "cpu-usage-4242");
    }
}
