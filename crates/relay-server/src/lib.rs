//! # relay-server
//!
//! axum HTTP API over the chat relay.
//!
//! | Method & Path | Purpose |
//! |---|---|
//! | `GET /api/health` | Liveness |
//! | `POST /api/chat` | Relay a message, record the reply |
//! | `GET /api/conversations` | List conversation ids |
//! | `GET /api/conversations/{id}` | Conversation history |
//! | `DELETE /api/conversations/{id}` | Clear a conversation |

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::ServerConfig;
pub use state::AppState;

use crate::handlers::{
    chat_handler, clear_conversation, get_conversation, health_check, list_conversations, not_found,
};

/// Build the API router with CORS, tracing and panic recovery
pub fn router(state: AppState) -> Router {
    // Any origin, no allow-list
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .route("/api/conversations", get(list_conversations))
        .route(
            "/api/conversations/{id}",
            get(get_conversation).delete(clear_conversation),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(error::panic_response)),
        )
        .with_state(state)
}
