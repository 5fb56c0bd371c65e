//! Inter-agent message types carried by the message bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentId;

/// Wire string for a broadcast recipient.
pub const BROADCAST_RECIPIENT: &str = "ALL";

/// Who a message is addressed to.
///
/// Serialized as a plain string: either an agent id or `"ALL"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recipient {
    All,
    Agent(AgentId),
}

impl From<String> for Recipient {
    fn from(s: String) -> Self {
        if s == BROADCAST_RECIPIENT {
            Recipient::All
        } else {
            Recipient::Agent(AgentId(s))
        }
    }
}

impl From<Recipient> for String {
    fn from(r: Recipient) -> Self {
        match r {
            Recipient::All => BROADCAST_RECIPIENT.to_string(),
            Recipient::Agent(id) => id.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Request,
    Response,
    Broadcast,
    Delegate,
}

/// Urgency attached to messages and goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub topic: String,
    pub data: Value,
    pub priority: Priority,
}

/// A single message between agents.
///
/// Transient: delivered synchronously at send time and kept in the bus's
/// audit queue until cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: uuid::Uuid,
    pub from: AgentId,
    pub to: Recipient,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    /// Build a broadcast addressed to every subscriber except the sender.
    pub fn broadcast(
        from: AgentId,
        topic: impl Into<String>,
        data: Value,
        priority: Priority,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            from,
            to: Recipient::All,
            kind: MessageKind::Broadcast,
            content: MessageContent { topic: topic.into(), data, priority },
            timestamp,
        }
    }

    /// Build a direct message of the given kind.
    pub fn direct(
        from: AgentId,
        to: AgentId,
        kind: MessageKind,
        topic: impl Into<String>,
        data: Value,
        priority: Priority,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            from,
            to: Recipient::Agent(to),
            kind,
            content: MessageContent { topic: topic.into(), data, priority },
            timestamp,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == Recipient::All
    }
}
