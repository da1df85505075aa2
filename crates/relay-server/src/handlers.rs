//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::Uri,
};
use serde::{Deserialize, Serialize};

use relay_core::{ChatOutcome, ConversationId, Message, RelayError};

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub success: bool,
    pub conversation: Vec<Message>,
    pub conversation_id: ConversationId,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub success: bool,
    pub conversations: Vec<ConversationId>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Chat relay API is running",
    })
}

/// Relay a message to the model and record the reply
///
/// An inference failure is still a 200: the outcome carries `success: false`
/// and the recorded error entry.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatOutcome>, ApiError> {
    let Json(request) = payload?;

    let message = request
        .message
        .ok_or_else(|| RelayError::Validation("Missing 'message' in request body".into()))?;
    let conversation_id = ConversationId::or_generate(request.conversation_id);

    let outcome = state.relay.process_message(&message, conversation_id).await;
    Ok(Json(outcome))
}

/// Conversation history; unknown ids yield an empty list
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ConversationResponse> {
    let conversation_id = ConversationId::from(id);
    Json(ConversationResponse {
        success: true,
        conversation: state.store.get(&conversation_id),
        conversation_id,
    })
}

/// Clear a conversation; clearing an unknown id succeeds
pub async fn clear_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ClearResponse> {
    state.store.clear(&ConversationId::from(id));
    Json(ClearResponse {
        success: true,
        message: "Conversation cleared",
    })
}

/// All live conversation ids
pub async fn list_conversations(State(state): State<AppState>) -> Json<ConversationListResponse> {
    Json(ConversationListResponse {
        success: true,
        conversations: state.store.list(),
    })
}

/// JSON 404 for anything outside the API
pub async fn not_found(uri: Uri) -> ApiError {
    RelayError::NotFound(uri.path().to_owned()).into()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use relay_core::{ConversationStore, InferenceClient, InferenceRequest, Relay};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{AppState, router};

    /// Fixed reply or fixed network failure
    struct Stub(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl InferenceClient for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _request: &InferenceRequest) -> relay_core::Result<String> {
            self.0
                .map(str::to_owned)
                .map_err(|e| relay_core::RelayError::Inference(e.to_owned()))
        }
    }

    struct Exploding;

    #[async_trait]
    impl InferenceClient for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        async fn complete(&self, _request: &InferenceRequest) -> relay_core::Result<String> {
            panic!("stub exploded")
        }
    }

    fn app_with(client: Arc<dyn InferenceClient>) -> Router {
        let store = Arc::new(ConversationStore::new());
        router(AppState::new(Relay::with_defaults(client, store)))
    }

    fn replying(text: &'static str) -> Router {
        app_with(Arc::new(Stub(Ok(text))))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn chat(app: &Router, body: &Value) -> (StatusCode, Value) {
        send(app, Method::POST, "/api/chat", Some(&body.to_string())).await
    }

    async fn history(app: &Router, id: &str) -> Vec<Value> {
        let (status, body) = send(app, Method::GET, &format!("/api/conversations/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        body["conversation"].as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn test_health() {
        let app = replying("unused");
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_chat_success_scenario() {
        let app = replying("hi there");

        let (status, body) = chat(&app, &json!({"message": "hello", "conversation_id": "t1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "message": "hi there", "conversation_id": "t1"})
        );

        let entries = history(&app, "t1").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["content"], "hi there");
        assert_eq!(entries[0]["role"], "assistant");
        assert_eq!(entries[0]["kind"], "reply");
    }

    #[tokio::test]
    async fn test_chat_adds_exactly_one_entry() {
        let app = replying("ok");
        chat(&app, &json!({"message": "first", "conversation_id": "c1"})).await;
        let before = history(&app, "c1").await.len();

        chat(&app, &json!({"message": "second", "conversation_id": "c1"})).await;
        assert_eq!(history(&app, "c1").await.len(), before + 1);
    }

    #[tokio::test]
    async fn test_chat_generates_conversation_id() {
        let app = replying("ok");
        let (status, body) = chat(&app, &json!({"message": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        let id = body["conversation_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert_eq!(history(&app, id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_400() {
        let app = replying("unused");
        let (status, body) = chat(&app, &json!({"conversation_id": "x"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing 'message' in request body");

        let (_, list) = send(&app, Method::GET, "/api/conversations", None).await;
        assert_eq!(list["conversations"], json!([]));
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_400() {
        let app = replying("unused");

        let (status, body) = send(&app, Method::POST, "/api/chat", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, Method::POST, "/api/chat", Some(r#"{"message": 42}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_inference_failure_scenario() {
        let app = app_with(Arc::new(Stub(Err("connection refused"))));

        let (status, body) = chat(&app, &json!({"message": "hello", "conversation_id": "t2"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["conversation_id"], "t2");
        assert_eq!(
            body["error"],
            "Error calling inference endpoint: connection refused"
        );
        assert_eq!(body["message"]["kind"], "error");

        let entries = history(&app, "t2").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["kind"], "error");
        assert!(entries[0]["content"]
            .as_str()
            .unwrap()
            .starts_with("I'm sorry, I encountered an error:"));
        assert_eq!(entries[0]["tools_used"], json!([]));
        assert!(entries[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_empty() {
        let app = replying("ok");
        chat(&app, &json!({"message": "hello", "conversation_id": "gone"})).await;

        let (status, body) = send(&app, Method::DELETE, "/api/conversations/gone", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "Conversation cleared"}));

        let (status, body) = send(&app, Method::GET, "/api/conversations/gone", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["conversation"], json!([]));
        assert_eq!(body["conversation_id"], "gone");
    }

    #[tokio::test]
    async fn test_delete_unknown_succeeds() {
        let app = replying("ok");
        let (status, body) = send(&app, Method::DELETE, "/api/conversations/never", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_list_tracks_chats_and_deletes() {
        let app = app_with(Arc::new(Stub(Err("down"))));
        for id in ["a", "b", "c"] {
            chat(&app, &json!({"message": "hi", "conversation_id": id})).await;
        }
        send(&app, Method::DELETE, "/api/conversations/b", None).await;

        let (status, body) = send(&app, Method::GET, "/api/conversations", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "conversations": ["a", "c"]}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let app = replying("ok");
        let (status, body) = send(&app, Method::GET, "/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_handler_panic_is_500_envelope() {
        let app = app_with(Arc::new(Exploding));
        let (status, body) = chat(&app, &json!({"message": "hello", "conversation_id": "p"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("stub exploded"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = replying("ok");
        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
