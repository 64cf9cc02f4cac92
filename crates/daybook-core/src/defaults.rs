//! Centralized default constants for daybook.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8080;

/// Default CORS max-age in seconds (12 hours).
pub const CORS_MAX_AGE_SECS: u64 = 43_200;

/// Owner id used by a fresh single-user install until one is configured.
pub const OWNER_ID: &str = "02a0aa58-b88a-46f1-9799-f103e04c0b72";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default chat/completion model name (Ollama).
pub const CHAT_MODEL: &str = "llama3.2";

/// Default embedding vector dimension for nomic-embed-text. Fixed per
/// deployment; must match what the model actually returns.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// EMBEDDING SYNC
// =============================================================================

/// Interval between sync cycles in seconds.
pub const SYNC_INTERVAL_SECS: u64 = 60;

/// Stale entries pulled per sync cycle. Small on purpose: bounds worst-case
/// cycle latency so a slow embedding backend cannot starve the interval.
pub const SYNC_BATCH_SIZE: i64 = 10;

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Nearest neighbors offered to the generative model per question.
pub const RETRIEVAL_TOP_K: i64 = 5;

/// Result cap for substring search.
pub const SEARCH_LIMIT: i64 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_defaults_are_sane() {
        const {
            assert!(SYNC_BATCH_SIZE > 0);
            assert!(SYNC_INTERVAL_SECS > 0);
            assert!(RETRIEVAL_TOP_K > 0);
            assert!(EMBED_DIMENSION > 0);
        }
    }

    #[test]
    fn default_owner_id_parses() {
        assert!(uuid::Uuid::parse_str(OWNER_ID).is_ok());
    }
}
