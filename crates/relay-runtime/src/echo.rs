//! Echo client: replies with the input prefixed by `[echo]`.
//! Lets the full HTTP round-trip run without cloud credentials.

use async_trait::async_trait;
use relay_core::{
    error::Result,
    provider::{InferenceClient, InferenceRequest},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoClient;

#[async_trait]
impl InferenceClient for EchoClient {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String> {
        Ok(format!("[echo] {}", request.input))
    }
}
