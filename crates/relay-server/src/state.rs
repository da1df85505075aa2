//! Application State

use std::sync::Arc;

use relay_core::{ConversationStore, Relay};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Chat turn orchestration (inference client + store)
    pub relay: Arc<Relay>,

    /// Conversation store, shared with the relay
    pub store: Arc<ConversationStore>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        let store = Arc::clone(relay.store());
        Self {
            relay: Arc::new(relay),
            store,
        }
    }
}
