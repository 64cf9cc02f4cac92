//! Deterministic mock inference backend for tests.
//!
//! Embeddings are a hashed bag-of-tokens projection: the same text always
//! produces the same unit vector, and texts sharing words land close
//! together, which is enough to exercise nearest-neighbor behavior without
//! a model server. Failures are injected with explicit toggles rather than
//! randomness so tests stay reproducible.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use daybook_core::{EmbeddingBackend, Error, GenerationBackend, Result, Vector};

/// Mock backend implementing both inference traits.
pub struct MockBackend {
    dimension: usize,
    response: Mutex<String>,
    fail_embeddings: AtomicBool,
    fail_generation: AtomicBool,
    /// When set, only embeddings of texts containing this substring fail.
    fail_embed_containing: Mutex<Option<String>>,
    embed_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            dimension: 32,
            response: Mutex::new("Mock response\nCITATIONS: none".to_string()),
            fail_embeddings: AtomicBool::new(false),
            fail_generation: AtomicBool::new(false),
            fail_embed_containing: Mutex::new(None),
            embed_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the fixed response returned by generation calls.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        *self.response.lock().unwrap() = response.into();
        self
    }

    /// Make every embed call fail.
    pub fn fail_embeddings(&self, on: bool) {
        self.fail_embeddings.store(on, Ordering::SeqCst);
    }

    /// Make only embeds whose input contains `needle` fail.
    pub fn fail_embeds_containing(&self, needle: impl Into<String>) {
        *self.fail_embed_containing.lock().unwrap() = Some(needle.into());
    }

    /// Make every generation call fail.
    pub fn fail_generation(&self, on: bool) {
        self.fail_generation.store(on, Ordering::SeqCst);
    }

    /// Number of embed calls that reached the backend.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Number of generation calls that reached the backend.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Last (system, prompt) pair passed to generation, if any.
    pub fn last_prompt(&self) -> Option<(String, String)> {
        self.prompts.lock().unwrap().last().cloned()
    }

    /// Deterministic bag-of-tokens projection onto the unit sphere.
    pub fn project(text: &str, dimension: usize) -> Vector {
        let mut acc = vec![0.0f32; dimension];
        for token in text.split_whitespace() {
            // FNV-1a over the token bytes picks a bucket and a sign.
            let mut h: u64 = 0xcbf2_9ce4_8422_2325;
            for b in token.bytes() {
                h ^= u64::from(b);
                h = h.wrapping_mul(0x0000_0100_0000_01b3);
            }
            let idx = (h % dimension as u64) as usize;
            let sign = if h & (1 << 63) == 0 { 1.0 } else { -1.0 };
            acc[idx] += sign;
        }
        let norm = acc.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut acc {
                *v /= norm;
            }
        }
        Vector::from(acc)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockBackend {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(Error::Embedding("simulated embedding failure".to_string()));
        }
        if let Some(needle) = self.fail_embed_containing.lock().unwrap().as_deref() {
            if text.contains(needle) {
                return Err(Error::Embedding(format!(
                    "simulated embedding failure for input containing {needle:?}"
                )));
            }
        }
        if text.is_empty() {
            return Ok(Vector::from(vec![0.0; self.dimension]));
        }
        Ok(Self::project(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));

        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(Error::Inference("simulated generation failure".to_string()));
        }
        Ok(self.response.lock().unwrap().clone())
    }

    fn model_name(&self) -> &str {
        "mock-chat"
    }
}
