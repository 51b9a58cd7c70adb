//! Chat endpoint implementing the conversation state machine
//!
//! Before a credential exists, a submission is treated as a candidate API
//! key and validated with a canary query. Afterwards, submissions are
//! questions answered against the index. Backend failures never fail the
//! session; they degrade to inline messages in the conversation log.

use axum::{extract::State, Json};

use crate::credentials::ApiKey;
use crate::error::Error;
use crate::retrieval::QUERY_FAILED_ANSWER;
use crate::server::state::{AppState, SessionPhase};
use crate::types::chat::ChatMessage;
use crate::types::request::ChatRequest;
use crate::types::response::ChatResponse;

/// Shown once when the service starts without a stored key.
pub const PROMPT_FOR_KEY: &str =
    "No OpenAI API key is configured. Please enter your API key and press send.";

/// Shown when a candidate key fails the canary query.
pub const INVALID_KEY: &str =
    "That OpenAI API key was rejected. Please enter a valid key and press send.";

/// Shown after a key is accepted; the log is reset to this message.
pub const WELCOME: &str = "Welcome! Upload a PDF and ask me anything about it.";

/// POST /api/chat - submit a question (or, before setup, an API key)
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    Json(run_turn(&state, request).await)
}

/// One turn of the conversation state machine.
pub(crate) async fn run_turn(state: &AppState, request: ChatRequest) -> ChatResponse {
    let question = request.question.trim().to_string();
    let mut messages = request.messages;

    if state.phase() == SessionPhase::NoCredential {
        return credential_turn(state, &question, messages).await;
    }

    // Empty submission: leave the log alone, just clear the input field.
    if question.is_empty() {
        return ChatResponse::new(messages);
    }

    messages.push(ChatMessage::user(&question));
    let answer = match state.responder().answer(&question).await {
        Ok(answer) => answer,
        Err(Error::MissingCredential | Error::InvalidCredential(_)) => {
            tracing::warn!("Stored API key no longer accepted");
            INVALID_KEY.to_string()
        }
        Err(e) => {
            tracing::error!("Answer failed: {}", e);
            QUERY_FAILED_ANSWER.to_string()
        }
    };
    messages.push(ChatMessage::assistant(answer));

    ChatResponse::new(messages)
}

/// Handle a submission while no credential is configured. A non-empty
/// submission is a candidate key; it is installed transiently, validated
/// with a canary query, and only persisted when the canary succeeds.
async fn credential_turn(
    state: &AppState,
    candidate: &str,
    mut messages: Vec<ChatMessage>,
) -> ChatResponse {
    if candidate.is_empty() {
        // Prompt once; repeated empty submissions do not stack prompts.
        if messages.is_empty() {
            messages.push(ChatMessage::assistant(PROMPT_FOR_KEY));
        }
        return ChatResponse::new(messages);
    }

    let key = ApiKey::new(candidate);
    state.credentials().install_transient(key.clone());

    let canary = state.config().openai.canary_question.clone();
    match state.builder().rebuild_validated(&canary).await {
        Ok(_) => match state.credentials().save_credential(&key) {
            Ok(()) => {
                tracing::info!("API key validated and saved");
                ChatResponse::new(vec![ChatMessage::assistant(WELCOME)])
            }
            Err(e) => {
                tracing::error!("Failed to persist credential: {}", e);
                state.credentials().clear_transient();
                messages.push(ChatMessage::assistant(format!(
                    "Could not save the API key: {}",
                    e
                )));
                ChatResponse::new(messages)
            }
        },
        Err(e) => {
            tracing::warn!("Candidate API key rejected: {}", e);
            state.credentials().clear_transient();
            messages.push(ChatMessage::assistant(INVALID_KEY));
            ChatResponse::new(messages)
        }
    }
}
