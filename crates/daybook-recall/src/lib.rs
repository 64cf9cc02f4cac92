//! # daybook-recall
//!
//! The semantic-retrieval pipeline for daybook:
//!
//! - [`sync::EmbeddingSyncService`] — recurring, mutex-serialized
//!   background job keeping one embedding per entry in sync with its text.
//! - [`answer::AnswerEngine`] — per-question retrieval, grounded prompting,
//!   and tolerant citation resolution.
//!
//! Embeddings flow one direction (entries -> vectors -> store) through the
//! scheduler; retrieval is read-only and never writes a vector.

pub mod answer;
pub mod citations;
pub mod prompt;
pub mod sync;

pub use answer::{Answer, AnswerEngine};
pub use citations::{parse_ordinals, split_answer};
pub use prompt::{answer_prompt, context_block, CITATION_MARKER, SYSTEM_PROMPT};
pub use sync::{embedding_input, EmbeddingSyncService, SyncConfig};
