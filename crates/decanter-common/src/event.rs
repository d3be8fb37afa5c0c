use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Property name carrying the event type (e.g. `"jmx"`, `"cpu"`).
pub const TYPE_PROPERTY: &str = "type";

/// A typed value attached to an event property.
///
/// Numeric widths are kept distinct so that alert events copy them back out
/// unchanged. `Decimal` holds the canonical text of an arbitrary-precision
/// number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(String),
    Bool(bool),
    String(String),
    Other(serde_json::Value),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal(v) | Self::String(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Long(i)
                } else if n.is_u64() {
                    // Above i64::MAX: keep the exact digits.
                    Self::Decimal(n.to_string())
                } else {
                    n.as_f64()
                        .map_or_else(|| Self::Decimal(n.to_string()), Self::Double)
                }
            }
            other => Self::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i16> for PropertyValue {
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Insertion-ordered property list. Setting an existing name replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of event properties")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Properties, A::Error> {
                let mut props = Properties::new();
                while let Some((name, value)) = access.next_entry::<String, PropertyValue>()? {
                    props.insert(name, value);
                }
                Ok(props)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

/// An immutable collected event as produced by a collector.
///
/// # Examples
///
/// ```
/// use decanter_common::event::Event;
///
/// let event = Event::builder("decanter/collect/jmx")
///     .property("type", "jmx")
///     .property("HeapMemoryUsage", 512_i64)
///     .build();
/// assert_eq!(event.event_type(), Some("jmx"));
/// assert_eq!(event.property_names().collect::<Vec<_>>(), ["type", "HeapMemoryUsage"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    topic: String,
    #[serde(default)]
    properties: Properties,
}

impl Event {
    pub fn new(topic: impl Into<String>, properties: Properties) -> Self {
        Self {
            topic: topic.into(),
            properties,
        }
    }

    pub fn builder(topic: impl Into<String>) -> EventBuilder {
        EventBuilder {
            topic: topic.into(),
            properties: Properties::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The `type` property, when present as a string.
    pub fn event_type(&self) -> Option<&str> {
        self.property(TYPE_PROPERTY).and_then(PropertyValue::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.names()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

pub struct EventBuilder {
    topic: String,
    properties: Properties,
}

impl EventBuilder {
    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn build(self) -> Event {
        Event::new(self.topic, self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_map_to_long_and_double() {
        let event: Event = serde_json::from_str(
            r#"{"topic":"decanter/collect/jmx","properties":{"type":"jmx","count":12,"load":0.75,"up":true,"tags":["a"]}}"#,
        )
        .unwrap();
        assert_eq!(event.property("count"), Some(&PropertyValue::Long(12)));
        assert_eq!(event.property("load"), Some(&PropertyValue::Double(0.75)));
        assert_eq!(event.property("up"), Some(&PropertyValue::Bool(true)));
        assert!(matches!(event.property("tags"), Some(PropertyValue::Other(_))));
    }

    #[test]
    fn integers_beyond_long_stay_exact() {
        let event: Event = serde_json::from_str(
            r#"{"topic":"t","properties":{"max":18446744073709551615,"min":-9223372036854775808}}"#,
        )
        .unwrap();
        assert_eq!(
            event.property("max"),
            Some(&PropertyValue::Decimal("18446744073709551615".into()))
        );
        assert_eq!(event.property("min"), Some(&PropertyValue::Long(i64::MIN)));
    }

    #[test]
    fn property_order_follows_input() {
        let event: Event = serde_json::from_str(
            r#"{"topic":"t","properties":{"zeta":1,"alpha":2,"mid":3}}"#,
        )
        .unwrap();
        let names: Vec<_> = event.property_names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn insert_replaces_existing_value_in_place() {
        let mut props = Properties::new();
        props.insert("a", 1_i64);
        props.insert("b", 2_i64);
        props.insert("a", "x");
        assert_eq!(props.len(), 2);
        assert_eq!(props.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(props.get("a"), Some(&PropertyValue::from("x")));
    }

    #[test]
    fn event_type_requires_string_value() {
        let event = Event::builder("t").property("type", 3_i64).build();
        assert_eq!(event.event_type(), None);
    }

    #[test]
    fn display_stringifies_values() {
        assert_eq!(PropertyValue::Long(42).to_string(), "42");
        assert_eq!(PropertyValue::Bool(false).to_string(), "false");
        assert_eq!(PropertyValue::Decimal("1.50".into()).to_string(), "1.50");
        assert_eq!(PropertyValue::from("ok").to_string(), "ok");
    }
}
