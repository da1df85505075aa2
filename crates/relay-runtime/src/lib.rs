//! # relay-runtime
//!
//! Inference clients for the chat relay.
//!
//! ## Providers
//!
//! - **Bedrock** (default): Anthropic models through the Bedrock runtime API
//! - **Echo**: offline stand-in that repeats the input
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_runtime::{build, ProviderKind};
//!
//! let client = build(ProviderKind::Bedrock, Duration::from_secs(60)).await?;
//! let relay = Relay::with_defaults(client, store);
//! ```

#[cfg(feature = "bedrock")]
pub mod bedrock;
pub mod echo;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "bedrock")]
pub use bedrock::{BedrockClient, BedrockConfig};
pub use echo::EchoClient;

// Re-export core types for convenience
pub use relay_core::{InferenceClient, InferenceRequest, RelayError, Result};

/// Which inference client to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Bedrock,
    Echo,
}

#[derive(Error, Debug)]
#[error("unknown inference provider: {0} (expected \"bedrock\" or \"echo\")")]
pub struct UnknownProvider(pub String);

impl std::str::FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bedrock" => Ok(Self::Bedrock),
            "echo" => Ok(Self::Echo),
            other => Err(UnknownProvider(other.to_owned())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bedrock => write!(f, "bedrock"),
            Self::Echo => write!(f, "echo"),
        }
    }
}

/// Construct the configured client. Bedrock settings come from the
/// environment and the AWS credential chain; `timeout` bounds each call.
pub async fn build(kind: ProviderKind, timeout: Duration) -> anyhow::Result<Arc<dyn InferenceClient>> {
    match kind {
        ProviderKind::Echo => Ok(Arc::new(EchoClient)),
        #[cfg(feature = "bedrock")]
        ProviderKind::Bedrock => {
            let config = BedrockConfig {
                timeout,
                ..BedrockConfig::from_env()
            };
            let client = BedrockClient::load(config).await;
            tracing::info!(model = client.model_id(), "Bedrock client ready");
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "bedrock"))]
        ProviderKind::Bedrock => {
            let _ = timeout;
            anyhow::bail!("built without the \"bedrock\" feature")
        }
    }
}
