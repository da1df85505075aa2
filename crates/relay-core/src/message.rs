//! Conversation Messages
//!
//! The single entry shape stored in every conversation. Replies and recorded
//! failures share it; `kind` tells them apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Assistant (model) response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Whether an entry is a normal reply or a recorded failure
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Reply,
    Error,
}

/// A single entry in a conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Names of tools used to produce this message
    #[serde(default)]
    pub tools_used: Vec<String>,

    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Reply or recorded failure
    #[serde(default)]
    pub kind: EntryKind,
}

impl Message {
    /// Create a new message without a timestamp
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tools_used: Vec::new(),
            timestamp: None,
            kind: EntryKind::Reply,
        }
    }

    /// Create a timestamped assistant reply
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content).with_timestamp(Utc::now())
    }

    /// Create a timestamped error entry
    pub fn error(content: impl Into<String>) -> Self {
        let mut msg = Self::assistant(content);
        msg.kind = EntryKind::Error;
        msg
    }

    /// Attach the tools used to produce this message
    #[must_use]
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools_used = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Set the timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == EntryKind::Error
    }

    /// JSON-compatible mapping of this message, same fields as [`Self::to_json`]
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialized JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
