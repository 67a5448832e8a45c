use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Default,
    TaskResult,
    TeamResult,
}

/// A message exchanged between agents. Immutable once created; agents append
/// messages to their logs and never rewrite them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender_id: String,
    pub content: Value,
    pub kind: MessageKind,
    pub metadata: Metadata,
}

impl Message {
    pub fn new(sender_id: impl Into<String>, content: Value, kind: MessageKind) -> Self {
        Self {
            sender_id: sender_id.into(),
            content,
            kind,
            metadata: Metadata::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}
