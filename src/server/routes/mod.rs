//! API routes for the chat service

pub mod chat;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for base64 payloads
        .route(
            "/upload",
            post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Chat
        .route("/chat", post(chat::chat))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "paperchat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Chat over uploaded PDF documents",
        "endpoints": {
            "POST /api/upload": "Upload PDF documents (base64 data-URL payloads)",
            "POST /api/chat": "Ask a question against the indexed documents",
            "GET /api/info": "This document"
        }
    }))
}
