//! Inference Client Strategy
//!
//! Common interface for remote text-generation endpoints. The relay builds an
//! [`InferenceRequest`]; each client turns it into its provider's payload and
//! extracts the reply text.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_core::provider::{InferenceClient, InferenceRequest};
//!
//! let client = BedrockClient::load(BedrockConfig::from_env()).await;
//! let reply = client.complete(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Fixed sampling parameters sent with every call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

const fn default_max_tokens() -> u32 { 2000 }
const fn default_temperature() -> f32 { 0.7 }
const fn default_top_p() -> f32 { 0.9 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

/// Everything a client needs to produce one reply
#[derive(Clone, Debug)]
pub struct InferenceRequest {
    /// System instructions (persona and behavioral rules)
    pub system: String,

    /// Stored entries of the conversation, oldest first
    pub history: Vec<Message>,

    /// The new user input
    pub input: String,

    pub options: GenerationOptions,
}

impl InferenceRequest {
    /// History serialized as one opaque JSON text block
    pub fn history_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.history)?)
    }
}

/// Strategy trait for inference endpoints
///
/// Implementations must report every failure as
/// [`RelayError::Inference`](crate::RelayError::Inference); an absent or empty
/// reply is a failure, never an empty string.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Produce the reply text for a request
    async fn complete(&self, request: &InferenceRequest) -> Result<String>;
}
