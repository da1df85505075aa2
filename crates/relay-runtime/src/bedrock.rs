//! Bedrock Inference Client
//!
//! Implementation of `InferenceClient` for Anthropic models served through
//! the Bedrock runtime `InvokeModel` API.
//!
//! Credentials come from the AWS default provider chain: environment keys,
//! shared profiles (including SSO), web identity, and container or instance
//! roles. The SDK signs every request and refreshes credentials as they
//! expire.
//!
//! The whole stored history travels as one JSON text block next to the new
//! input, inside a single user turn. Models deployed behind this relay are
//! prompted that way, so the framing is kept as-is.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_sdk_bedrockruntime::{
    Client,
    config::{BehaviorVersion, Region, retry::RetryConfig, timeout::TimeoutConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::Blob,
};
use relay_core::{
    error::{RelayError, Result},
    provider::{InferenceClient, InferenceRequest},
};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock client configuration
#[derive(Clone, Debug)]
pub struct BedrockConfig {
    /// AWS region, e.g. `us-east-1`
    pub region: String,

    /// Model id or inference-profile id/ARN
    pub model_id: String,

    /// Endpoint base URL; derived from the region when `None`
    pub endpoint: Option<String>,

    /// Named shared-config profile to take credentials from
    pub profile: Option<String>,

    /// Shared credentials file replacing `~/.aws/credentials`
    pub credentials_file: Option<PathBuf>,

    /// Bound on one `InvokeModel` operation
    pub timeout: Duration,
}

impl BedrockConfig {
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    pub const DEFAULT_MODEL_ID: &'static str = "us.anthropic.claude-3-5-haiku-20241022-v1:0";

    pub fn new(region: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            model_id: model_id.into(),
            endpoint: None,
            profile: None,
            credentials_file: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; empty values count as unset.
    ///
    /// Credentials are not read here. They are resolved through the
    /// provider chain when the client is loaded.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| Self::DEFAULT_REGION.into());
        let model_id = get("BEDROCK_MODEL_ID").unwrap_or_else(|| Self::DEFAULT_MODEL_ID.into());

        Self {
            endpoint: get("BEDROCK_ENDPOINT").map(|url| url.trim_end_matches('/').to_owned()),
            profile: get("AWS_PROFILE"),
            ..Self::new(region, model_id)
        }
    }
}

#[derive(Serialize)]
struct InvokeBody<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Turn<'a>>,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: std::borrow::Cow<'a, str>,
}

impl<'a> TextBlock<'a> {
    fn new(text: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

#[derive(Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Bedrock inference client
pub struct BedrockClient {
    client: Client,
    model_id: String,
}

impl BedrockClient {
    /// Resolve region, credentials and endpoint through the AWS config
    /// loader, then build the client
    pub async fn load(config: BedrockConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(path) = &config.credentials_file {
            loader = loader.profile_files(
                ProfileFiles::builder()
                    .with_file(ProfileFileKind::Credentials, path)
                    .build(),
            );
        }
        let shared = loader.load().await;
        if shared.credentials_provider().is_none() {
            tracing::warn!("No AWS credentials provider resolved; Bedrock calls will fail");
        }

        let mut builder = aws_sdk_bedrockruntime::config::Builder::from(&shared)
            // A failed call is reported to the user, never replayed
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            );
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::from_sdk_config(builder.build(), config.model_id)
    }

    /// Wrap an already-built SDK configuration
    pub fn from_sdk_config(config: aws_sdk_bedrockruntime::Config, model_id: impl Into<String>) -> Self {
        Self {
            client: Client::from_conf(config),
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn build_body(request: &InferenceRequest) -> Result<Vec<u8>> {
        let history = request.history_json()?;
        let body = InvokeBody {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.options.max_tokens,
            system: &request.system,
            messages: vec![Turn {
                role: "user",
                content: vec![TextBlock::new(history), TextBlock::new(request.input.as_str())],
            }],
            temperature: request.options.temperature,
            top_p: request.options.top_p,
        };
        Ok(serde_json::to_vec(&body)?)
    }

    fn parse_reply(body: &[u8]) -> Result<String> {
        let response: InvokeResponse = serde_json::from_slice(body)
            .map_err(|e| RelayError::Inference(format!("malformed response: {e}")))?;
        let first = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::Inference("no response content".into()))?;
        first
            .text
            .ok_or_else(|| RelayError::Inference("response content has no text".into()))
    }

    fn describe_failure<E, R>(err: &SdkError<E, R>) -> RelayError
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let detail = match (err.code(), err.message()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            _ => DisplayErrorContext(err).to_string(),
        };
        RelayError::Inference(detail)
    }
}

#[async_trait]
impl InferenceClient for BedrockClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String> {
        let body = Self::build_body(request)?;
        tracing::debug!(model = %self.model_id, bytes = body.len(), "Invoking Bedrock model");

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| Self::describe_failure(&e))?;

        Self::parse_reply(output.body().as_ref())
    }
}
