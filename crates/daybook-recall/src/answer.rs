//! Retrieval-augmented answer engine.
//!
//! Per question: embed the query, pull the nearest entries, assemble a
//! grounded prompt, call the generation backend, and resolve the model's
//! self-reported citations back into full entry records.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use daybook_core::{
    EmbeddingBackend, Entry, EntryRepository, Error, GenerationBackend, Result, RetrievalHit,
    VectorStore,
};

use crate::citations::{parse_ordinals, split_answer};
use crate::prompt::{answer_prompt, context_block, SYSTEM_PROMPT};

/// A completed answer turn.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Opaque identifier for this turn, usable to re-display its citations
    /// later without re-querying.
    pub turn_id: Uuid,
    /// Answer text with the citation line stripped.
    pub text: String,
    /// Entries the model reported using: order-preserved, fully hydrated.
    pub sources: Vec<Entry>,
}

/// Orchestrates one retrieval-augmented answer per call. Stateless between
/// requests; retrieval never writes embeddings.
pub struct AnswerEngine {
    entries: Arc<dyn EntryRepository>,
    vectors: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingBackend>,
    generator: Arc<dyn GenerationBackend>,
    top_k: i64,
}

impl AnswerEngine {
    pub fn new(
        entries: Arc<dyn EntryRepository>,
        vectors: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingBackend>,
        generator: Arc<dyn GenerationBackend>,
        top_k: i64,
    ) -> Self {
        Self {
            entries,
            vectors,
            embedder,
            generator,
            top_k,
        }
    }

    /// Answer a free-text question against the owner's entries.
    ///
    /// The request fails only when no answer can be produced at all: an
    /// unreachable vector store or a failed completion call. Everything
    /// else (no context found, unparseable citations, vanished sources)
    /// degrades to a best-effort answer.
    pub async fn answer(&self, owner_id: Uuid, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let start = Instant::now();

        let hits = self.retrieve(owner_id, question).await?;
        debug!(result_count = hits.len(), "Retrieved context for question");

        let context = context_block(&hits);
        let prompt = answer_prompt(question, &context);
        let response = self.generator.generate_with_system(SYSTEM_PROMPT, &prompt).await?;

        let (text, segment) = split_answer(&response);
        let cited = segment
            .map(|s| parse_ordinals(s, hits.len()))
            .unwrap_or_default();

        let mut sources = Vec::with_capacity(cited.len());
        for ordinal in cited {
            let hit = &hits[ordinal - 1];
            match self.entries.fetch(hit.entry_id).await {
                Ok(entry) if !entry.archived => sources.push(entry),
                Ok(_) => {
                    debug!(entry_id = %hit.entry_id, "Cited entry archived since retrieval; skipping")
                }
                Err(e) => {
                    warn!(entry_id = %hit.entry_id, error = %e, "Failed to rehydrate cited entry; skipping")
                }
            }
        }

        info!(
            offered = hits.len(),
            cited = sources.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Answer turn complete"
        );

        Ok(Answer {
            turn_id: Uuid::new_v4(),
            text: text.to_string(),
            sources,
        })
    }

    /// Embed the question and query for neighbors. An embedding failure
    /// degrades to an empty context; a store failure is surfaced because no
    /// degraded path remains once the store itself is unreachable.
    async fn retrieve(&self, owner_id: Uuid, question: &str) -> Result<Vec<RetrievalHit>> {
        let query_vec = match self.embedder.embed(question).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Query embedding failed; answering without context");
                return Ok(Vec::new());
            }
        };

        self.vectors
            .nearest(owner_id, &query_vec, self.top_k)
            .await
            .map_err(|e| Error::Search(format!("nearest-neighbor query failed: {e}")))
    }
}
