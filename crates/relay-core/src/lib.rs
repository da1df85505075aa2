//! # relay-core
//!
//! Conversation model, in-memory conversation store and the orchestration
//! that relays a user message to a remote inference endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Relay                                │
//! │  ┌──────────────────┐   ┌──────────────────────────────┐    │
//! │  │ ConversationStore│───│  InferenceClient (Strategy)  │    │
//! │  │  (per-key locks) │   │  Bedrock / Echo / test stubs │    │
//! │  └──────────────────┘   └──────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `InferenceClient` trait keeps provider payloads out of the relay
//! logic; `relay-runtime` supplies the concrete clients.

pub mod conversation;
pub mod error;
pub mod message;
pub mod provider;
pub mod relay;
pub mod store;

pub use conversation::ConversationId;
pub use error::{RelayError, Result};
pub use message::{EntryKind, Message, Role};
pub use provider::{GenerationOptions, InferenceClient, InferenceRequest};
pub use relay::{ChatOutcome, ChatReply, Relay, RelayConfig};
pub use store::ConversationStore;
