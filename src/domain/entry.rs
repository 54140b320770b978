//! Audit log entries and the things they are submitted with
use super::labels::Labels;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The metadata shared by all entries of one `log` call
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub labels: Labels,
}

/// One message plus the metadata it is submitted with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub metadata: Arc<EntryMetadata>,
    pub message: String,
}

/// The resource the entries are attributed to
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

impl Resource {
    /// The generic resource type for entries not tied to a specific piece of infrastructure
    pub fn global() -> Self {
        Resource {
            type_: "global".to_string(),
            labels: Labels::new(),
        }
    }
}

/// What can be passed as the message of a `log` call: one string, or several that become one
/// entry each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Single(String),
    Batch(Vec<String>),
}

impl Message {
    /// Builds the entries in input order, all pointing at the same metadata.
    pub fn into_entries(self, metadata: EntryMetadata) -> Vec<Entry> {
        let metadata = Arc::new(metadata);
        let messages = match self {
            Message::Single(msg) => vec![msg],
            Message::Batch(msgs) => msgs,
        };
        messages
            .into_iter()
            .map(|message| Entry {
                metadata: Arc::clone(&metadata),
                message,
            })
            .collect()
    }
}

impl From<&str> for Message {
    fn from(msg: &str) -> Self {
        Message::Single(msg.to_string())
    }
}

impl From<String> for Message {
    fn from(msg: String) -> Self {
        Message::Single(msg)
    }
}

impl From<Vec<String>> for Message {
    fn from(msgs: Vec<String>) -> Self {
        Message::Batch(msgs)
    }
}

impl From<Vec<&str>> for Message {
    fn from(msgs: Vec<&str>) -> Self {
        Message::Batch(msgs.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Message {
    fn from(msgs: &[&str]) -> Self {
        Message::Batch(msgs.iter().map(|m| m.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Message {
    fn from(msgs: [&str; N]) -> Self {
        Message::Batch(msgs.iter().map(|m| m.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_message_is_one_entry() {
        let entries = Message::from("hello").into_entries(EntryMetadata::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "hello");
    }

    #[test]
    fn batch_keeps_order_and_shares_metadata() {
        let metadata = EntryMetadata {
            labels: Labels::from([("team".to_string(), "x".to_string())]),
        };
        let entries = Message::from(["a", "b", "c"]).into_entries(metadata);
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert!(Arc::ptr_eq(&entries[0].metadata, &entries[1].metadata));
        assert!(Arc::ptr_eq(&entries[1].metadata, &entries[2].metadata));
    }

    #[test]
    fn empty_batch_has_no_entries() {
        let entries = Message::Batch(vec![]).into_entries(EntryMetadata::default());
        assert!(entries.is_empty());
    }

    #[test]
    fn global_resource_serializes_type_only() {
        assert_eq!(
            serde_json::to_string(&Resource::global()).unwrap(),
            r#"{"type":"global"}"#
        );
    }
}
