//! Ollama inference backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use daybook_core::{
    defaults, EmbeddingBackend, Error, GenerationBackend, LlmConfig, Result, Vector,
};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::EMBED_MODEL;

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = defaults::CHAT_MODEL;

/// Default embedding dimension for nomic-embed-text.
pub const DEFAULT_DIMENSION: usize = defaults::EMBED_DIMENSION;

/// Ollama inference backend.
///
/// Stateless HTTP wrapper; no retries live here. Callers decide per call
/// site whether a failure aborts a batch item, degrades a request, or
/// surfaces to the user.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    embed_model: String,
    chat_model: String,
    dimension: usize,
    embed_timeout_secs: u64,
    gen_timeout_secs: u64,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_CHAT_MODEL.to_string(),
            DEFAULT_DIMENSION,
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(
        base_url: String,
        embed_model: String,
        chat_model: String,
        dimension: usize,
    ) -> Self {
        let embed_timeout = std::env::var("DAYBOOK_EMBED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::EMBED_TIMEOUT_SECS);

        let gen_timeout = std::env::var("DAYBOOK_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(gen_timeout))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing Ollama backend: url={}, embed={}, chat={}",
            base_url, embed_model, chat_model
        );

        Self {
            client,
            base_url,
            embed_model,
            chat_model,
            dimension,
            embed_timeout_secs: embed_timeout,
            gen_timeout_secs: gen_timeout,
        }
    }

    /// Create from the application configuration.
    pub fn from_llm_config(cfg: &LlmConfig) -> Self {
        Self::with_config(
            cfg.base_url.clone(),
            cfg.embedding_model.clone(),
            cfg.chat_model.clone(),
            cfg.embed_dimension,
        )
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let embed_model =
            std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        let dimension = std::env::var("EMBED_DIMENSION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DIMENSION);

        Self::with_config(base_url, embed_model, chat_model, dimension)
    }

    /// Override both request timeouts (seconds).
    pub fn with_timeouts(mut self, embed_secs: u64, gen_secs: u64) -> Self {
        self.embed_timeout_secs = embed_secs;
        self.gen_timeout_secs = gen_secs;
        self
    }

    /// Internal generation method shared by both generate variants.
    ///
    /// Uses the `/api/chat` endpoint, which keeps model reasoning separate
    /// from the final response content.
    async fn generate_internal(&self, system: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let mut messages = Vec::new();
        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(Duration::from_secs(self.gen_timeout_secs))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Malformed(format!("chat response: {e}")))?;

        let content = result.message.content;
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30_000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(content)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Chat API message for `/api/chat`.
#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request payload for the Ollama `/api/chat` endpoint.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Response from the Ollama `/api/chat` endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "ollama", op = "embed", model = %self.embed_model))]
    async fn embed(&self, text: &str) -> Result<Vector> {
        // Empty input has a defined result: the zero vector. Never let the
        // model substitute its own notion of "empty".
        if text.is_empty() {
            return Ok(Vector::from(vec![0.0; self.dimension]));
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: self.embed_model.clone(),
            input: vec![text.to_string()],
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .timeout(Duration::from_secs(self.embed_timeout_secs))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Malformed(format!("embedding response: {e}")))?;

        let raw = result
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Malformed("embedding response contained no vectors".to_string()))?;

        if raw.len() != self.dimension {
            return Err(Error::Config(format!(
                "embedding dimension mismatch: model returned {}, configured {}",
                raw.len(),
                self.dimension
            )));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            input_len = text.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > 5_000 {
            warn!(duration_ms = elapsed, slow = true, "Slow embedding operation");
        }
        Ok(Vector::from(raw))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "ollama", op = "generate", model = %self.chat_model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_internal("", prompt).await
    }

    #[instrument(skip(self, system, prompt), fields(subsystem = "inference", component = "ollama", op = "generate", model = %self.chat_model, prompt_len = prompt.len()))]
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_internal(system, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_short_circuits_to_zero_vector() {
        // Points at a dead address on purpose; an empty input must never
        // reach the network.
        let backend = OllamaBackend::with_config(
            "http://127.0.0.1:1".to_string(),
            "embed-model".to_string(),
            "chat-model".to_string(),
            16,
        );

        let vector = backend.embed("").await.unwrap();
        let values = vector.as_slice();
        assert_eq!(values.len(), 16);
        assert!(values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn with_config_keeps_models_independent() {
        let backend = OllamaBackend::with_config(
            "http://localhost:11434".to_string(),
            "embedder".to_string(),
            "generator".to_string(),
            768,
        );
        assert_eq!(EmbeddingBackend::model_name(&backend), "embedder");
        assert_eq!(GenerationBackend::model_name(&backend), "generator");
        assert_eq!(backend.dimension(), 768);
    }
}
