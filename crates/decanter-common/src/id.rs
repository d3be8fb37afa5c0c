use serde::{Deserialize, Serialize};
use snowflake::SnowflakeIdBucket;
use std::sync::Mutex;

/// Largest machine or node id a snowflake bucket can encode (5 bits each).
pub const MAX_NODE_PART: i32 = 31;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("Id: {part} id {value} is outside 0..=31")]
    OutOfRange { part: &'static str, value: i32 },
}

/// Machine/node pair identifying this process in alert event ids.
///
/// Deserialises from a `[machine, node]` array and rejects parts the
/// snowflake layout cannot hold, so a bad config fails at load time instead
/// of producing colliding ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct IdNode {
    machine: i32,
    node: i32,
}

impl IdNode {
    pub fn new(machine: i32, node: i32) -> Result<Self, IdError> {
        Ok(Self {
            machine: check_part("machine", machine)?,
            node: check_part("node", node)?,
        })
    }

    pub fn machine(&self) -> i32 {
        self.machine
    }

    pub fn node(&self) -> i32 {
        self.node
    }
}

fn check_part(part: &'static str, value: i32) -> Result<i32, IdError> {
    if (0..=MAX_NODE_PART).contains(&value) {
        Ok(value)
    } else {
        Err(IdError::OutOfRange { part, value })
    }
}

impl Default for IdNode {
    fn default() -> Self {
        Self { machine: 1, node: 1 }
    }
}

impl TryFrom<(i32, i32)> for IdNode {
    type Error = IdError;

    fn try_from((machine, node): (i32, i32)) -> Result<Self, Self::Error> {
        Self::new(machine, node)
    }
}

impl From<IdNode> for (i32, i32) {
    fn from(node: IdNode) -> Self {
        (node.machine, node.node)
    }
}

static ALERT_IDS: Mutex<Option<(IdNode, SnowflakeIdBucket)>> = Mutex::new(None);

/// Binds alert ids to `node`. Alerts created before this call use
/// [`IdNode::default`].
pub fn init(node: IdNode) {
    let mut ids = ALERT_IDS.lock().unwrap_or_else(|e| e.into_inner());
    *ids = Some((node, SnowflakeIdBucket::new(node.machine, node.node)));
}

/// The node alert ids are currently generated for.
pub fn current_node() -> IdNode {
    let ids = ALERT_IDS.lock().unwrap_or_else(|e| e.into_inner());
    ids.as_ref().map(|(node, _)| *node).unwrap_or_default()
}

/// Next alert event id, as a decimal string.
pub fn next_alert_id() -> String {
    let mut ids = ALERT_IDS.lock().unwrap_or_else(|e| e.into_inner());
    let (_, bucket) = ids.get_or_insert_with(|| {
        let node = IdNode::default();
        (node, SnowflakeIdBucket::new(node.machine, node.node))
    });
    bucket.get_id().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_parts_accept_the_five_bit_range() {
        assert!(IdNode::new(0, 0).is_ok());
        assert!(IdNode::new(MAX_NODE_PART, MAX_NODE_PART).is_ok());
    }

    #[test]
    fn out_of_range_parts_name_the_offender() {
        assert_eq!(
            IdNode::new(32, 1),
            Err(IdError::OutOfRange { part: "machine", value: 32 })
        );
        assert_eq!(
            IdNode::new(1, -1),
            Err(IdError::OutOfRange { part: "node", value: -1 })
        );
        assert_eq!(
            IdError::OutOfRange { part: "node", value: 40 }.to_string(),
            "Id: node id 40 is outside 0..=31"
        );
    }

    #[test]
    fn deserialises_from_pair_and_rejects_bad_parts() {
        let node: IdNode = serde_json::from_str("[3, 7]").unwrap();
        assert_eq!((node.machine(), node.node()), (3, 7));
        assert_eq!(serde_json::to_string(&node).unwrap(), "[3,7]");

        let err = serde_json::from_str::<IdNode>("[1, 99]").unwrap_err();
        assert!(err.to_string().contains("node id 99"), "{err}");
    }

    #[test]
    fn alert_ids_are_distinct_after_rebinding() {
        let node = IdNode::new(2, 5).unwrap();
        init(node);
        assert_eq!(current_node(), node);

        let first = next_alert_id();
        let second = next_alert_id();
        assert_ne!(first, second);
        assert!(first.parse::<i64>().is_ok(), "{first}");
    }
}
