//! Conversation Store
//!
//! Process-lifetime, in-memory mapping from conversation id to its ordered
//! entries. Reads and writes never fail: a poisoned lock is recovered rather
//! than surfaced, since every critical section leaves the map consistent.
//!
//! Callers that need a read-modify-write sequence on one conversation (the
//! relay's history → inference → append turn) hold [`ConversationStore::lock`]
//! for its whole duration. Other conversations are not blocked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::OwnedMutexGuard;

use crate::conversation::ConversationId;
use crate::message::Message;

#[derive(Debug)]
struct Entries {
    /// First-insertion order, used by `list`
    seq: u64,
    messages: Vec<Message>,
}

/// Held while a turn on one conversation is in progress
#[must_use = "the conversation is unlocked as soon as the guard is dropped"]
pub struct ConversationGuard {
    _guard: OwnedMutexGuard<()>,
}

/// In-memory conversation store with per-conversation locking
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<ConversationId, Entries>>,
    locks: Mutex<HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>>,
    next_seq: AtomicU64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of a conversation, or an empty list if it does not exist
    pub fn get(&self, id: &ConversationId) -> Vec<Message> {
        let conversations = self
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        conversations
            .get(id)
            .map(|entries| entries.messages.clone())
            .unwrap_or_default()
    }

    /// Append an entry, creating the conversation if needed
    pub fn append(&self, id: &ConversationId, entry: Message) {
        let mut conversations = self
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        conversations
            .entry(id.clone())
            .or_insert_with(|| Entries {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                messages: Vec::new(),
            })
            .messages
            .push(entry);
    }

    /// Remove a conversation; clearing an unknown id is a no-op
    pub fn clear(&self, id: &ConversationId) {
        let removed = self
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Keep the lock while a turn holds or awaits it.
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }

        if let Some(entries) = removed {
            tracing::debug!(
                conversation_id = %id,
                entries = entries.messages.len(),
                "Cleared conversation"
            );
        }
    }

    /// Ids of all live conversations, in first-insertion order
    pub fn list(&self) -> Vec<ConversationId> {
        let conversations = self
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = conversations
            .iter()
            .map(|(id, entries)| (entries.seq, id.clone()))
            .collect();
        ids.sort_unstable_by_key(|(seq, _)| *seq);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Number of live conversations
    pub fn len(&self) -> usize {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize turns on one conversation
    pub async fn lock(&self, id: &ConversationId) -> ConversationGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        ConversationGuard {
            _guard: lock.lock_owned().await,
        }
    }
}
