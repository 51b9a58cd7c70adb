//! OpenAI-compatible index backend
//!
//! Embeddings come from the embeddings endpoint, answers from chat
//! completions, and ranking is cosine similarity over the stored vectors.
//! The API key is resolved through the credential store on every request, so
//! a transient key installed for a canary check is picked up without a
//! restart.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::credentials::{ApiKey, CredentialStore};
use crate::error::{Error, Result};

use super::vector_index::{IndexEntry, SourceText, VectorIndex};
use super::IndexBackend;

/// Chunks embedded per HTTP request.
const EMBED_BATCH_SIZE: usize = 64;

const SYSTEM_PROMPT: &str = "You answer questions using only the provided document excerpts. \
     If the excerpts do not contain the answer, reply with an empty message.";

/// Index backend over an OpenAI-compatible HTTP API.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
    credentials: Arc<CredentialStore>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

impl OpenAiBackend {
    pub fn new(config: &OpenAiConfig, credentials: Arc<CredentialStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
            credentials,
        }
    }

    fn api_key(&self) -> Result<ApiKey> {
        self.credentials.current().ok_or(Error::MissingCredential)
    }

    /// Embed a batch of texts, preserving input order.
    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let key = self.api_key()?;
        let url = format!("{}/embeddings", self.config.base_url);
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let request = EmbeddingRequest {
                model: &self.config.embed_model,
                input: batch.to_vec(),
            };

            let response = self
                .client
                .post(&url)
                .bearer_auth(key.as_str())
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::InvalidCredential(body));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Query(format!(
                    "embedding request failed: HTTP {} - {}",
                    status, body
                )));
            }

            let parsed: EmbeddingResponse = response.json().await?;
            embeddings.extend(parsed.data.into_iter().map(|d| d.embedding));
        }

        Ok(embeddings)
    }

    /// Generate an answer from the question and retrieved context.
    async fn complete(&self, question: &str, context: &str) -> Result<String> {
        let key = self.api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatCompletionRequest {
            model: &self.config.chat_model,
            messages: vec![
                ApiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ApiMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(question, context),
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidCredential(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Query(format!(
                "completion failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Query("completion response had no choices".to_string()))
    }
}

#[async_trait]
impl IndexBackend for OpenAiBackend {
    async fn build(&self, chunks: &[SourceText]) -> Result<VectorIndex> {
        if chunks.is_empty() {
            // Nothing to embed; an empty index is still a valid artifact.
            return Ok(VectorIndex::default());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        tracing::info!(
            "Embedding {} chunks with {}",
            texts.len(),
            self.config.embed_model
        );

        let embeddings = self.embed_texts(&texts).await.map_err(build_phase)?;
        if embeddings.len() != chunks.len() {
            return Err(Error::index_build(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                filename: chunk.filename.clone(),
                text: chunk.text.clone(),
                embedding,
            })
            .collect();

        Ok(VectorIndex::new(entries))
    }

    async fn query(&self, index: &VectorIndex, question: &str) -> Result<String> {
        // The question is embedded before the index is inspected: a canary
        // call with a candidate key must reach the service even when nothing
        // is indexed yet.
        let query_embedding = self
            .embed_texts(&[question])
            .await
            .map_err(query_phase)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Query("embedding response was empty".to_string()))?;

        if index.is_empty() {
            return Ok(String::new());
        }

        let top = index.top_k(&query_embedding, self.config.top_k);
        tracing::debug!("Answering with {} context chunks", top.len());

        let context = build_context(&top);
        let answer = self.complete(question, &context).await.map_err(query_phase)?;
        Ok(answer.trim().to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Format retrieved entries as a numbered context block.
fn build_context(entries: &[&IndexEntry]) -> String {
    let mut context = String::new();
    for (i, entry) in entries.iter().enumerate() {
        context.push_str(&format!("[{}] {}\n{}\n\n", i + 1, entry.filename, entry.text));
    }
    context
}

fn build_user_prompt(question: &str, context: &str) -> String {
    format!(
        "Document excerpts:\n\n{}\nQuestion: {}",
        context, question
    )
}

/// Reattribute a transport failure to the index-build phase. Credential
/// errors keep their kind so callers can re-prompt for a key.
fn build_phase(e: Error) -> Error {
    match e {
        Error::MissingCredential | Error::InvalidCredential(_) | Error::IndexBuild(_) => e,
        Error::Query(msg) => Error::IndexBuild(msg),
        other => Error::IndexBuild(other.to_string()),
    }
}

/// Same reattribution for the query phase.
fn query_phase(e: Error) -> Error {
    match e {
        Error::MissingCredential | Error::InvalidCredential(_) | Error::Query(_) => e,
        other => Error::Query(other.to_string()),
    }
}
