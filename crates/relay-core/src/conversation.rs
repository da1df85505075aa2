//! Conversation Identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque conversation key, client supplied or server generated
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Generate a fresh random identifier (UUID v4)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Use the supplied identifier, or generate one when absent
    pub fn or_generate(id: Option<String>) -> Self {
        id.map_or_else(Self::new, Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
