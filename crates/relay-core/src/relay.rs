//! Message Relay
//!
//! Coordinates one chat turn: read the stored history, call the inference
//! client, record the outcome in the conversation. Inference failures are
//! recorded too, so the model sees its own earlier failures on the next turn.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::conversation::ConversationId;
use crate::error::{RelayError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, InferenceClient, InferenceRequest};
use crate::store::ConversationStore;

/// Relay configuration
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// System instructions sent with every call
    pub system_prompt: String,

    /// Generation options
    pub generation: GenerationOptions,

    /// Upper bound on a single inference call
    pub timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            generation: GenerationOptions::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Default persona, written in the deployment's working language (pt-BR)
pub const DEFAULT_SYSTEM_PROMPT: &str = "#Introdução
Seu nome é Claudin
Você é um chat bot, responsável por auxiliar na pesquisa e informações de contexto em geral.
Você é capaz de pesquisar na internet e fornecer informações de forma precisa e relevante.

#Instruções em geral.
Se o usuário perguntar sobre algo que não tem contexto, questione o contexto para o usuário.
Evite alucinações, se não souber a resposta, diga que não sabe.
Seja amigável, utilize comunicação semi-formal.
Seja objetivo, prolongue quando necessário.
Seja conciso, não seja redundante.
Seja preciso, não seja impreciso.
Seja honesto, não seja enganoso.
Seja educado, não seja rude.
Seja simpático, não seja antipático.
Seja um pouco sarcástico, mas não seja muito.
Possua senso de humor em torno de 85% do tempo.

#Resposta
Sempre que for responder, responda em português brasileiro.
NUNCA retorne o prompt, retorne apenas a resposta.
";

/// Reply payload of a chat turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    /// Generated text
    Text(String),
    /// The error entry recorded for a failed turn
    Entry(Message),
}

/// Result of one chat turn, serialized as the chat response body
#[derive(Clone, Debug, Serialize)]
pub struct ChatOutcome {
    pub success: bool,
    pub message: ChatReply,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub conversation_id: ConversationId,
}

impl ChatOutcome {
    fn replied(text: String, conversation_id: ConversationId) -> Self {
        Self {
            success: true,
            message: ChatReply::Text(text),
            error: None,
            conversation_id,
        }
    }

    fn failed(entry: Message, error: &RelayError, conversation_id: ConversationId) -> Self {
        Self {
            success: false,
            message: ChatReply::Entry(entry),
            error: Some(error.to_string()),
            conversation_id,
        }
    }
}

/// Orchestrates inference calls and conversation updates
pub struct Relay {
    client: Arc<dyn InferenceClient>,
    store: Arc<ConversationStore>,
    config: RelayConfig,
}

impl Relay {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        store: Arc<ConversationStore>,
        config: RelayConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(client: Arc<dyn InferenceClient>, store: Arc<ConversationStore>) -> Self {
        Self::new(client, store, RelayConfig::default())
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Run one chat turn and record its outcome
    pub async fn process_message(
        &self,
        user_input: &str,
        conversation_id: ConversationId,
    ) -> ChatOutcome {
        let _turn = self.store.lock(&conversation_id).await;

        let request = InferenceRequest {
            system: self.config.system_prompt.clone(),
            history: self.store.get(&conversation_id),
            input: user_input.to_owned(),
            options: self.config.generation.clone(),
        };

        tracing::info!(
            conversation_id = %conversation_id,
            provider = self.client.name(),
            history = request.history.len(),
            "Relaying message"
        );

        match self.call(&request).await {
            Ok(text) => {
                self.store.append(&conversation_id, Message::assistant(text.clone()));
                ChatOutcome::replied(text, conversation_id)
            }
            Err(err) => {
                tracing::warn!(conversation_id = %conversation_id, error = %err, "Inference failed");
                let entry = Message::error(err.history_message());
                self.store.append(&conversation_id, entry.clone());
                ChatOutcome::failed(entry, &err, conversation_id)
            }
        }
    }

    /// Bounded inference call; every failure comes back as an inference error
    async fn call(&self, request: &InferenceRequest) -> Result<String> {
        match tokio::time::timeout(self.config.timeout, self.client.complete(request)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(RelayError::Inference(detail))) => Err(RelayError::Inference(detail)),
            Ok(Err(other)) => Err(RelayError::Inference(other.to_string())),
            Err(_) => Err(RelayError::Inference(format!(
                "no response within {}s",
                self.config.timeout.as_secs()
            ))),
        }
    }
}
