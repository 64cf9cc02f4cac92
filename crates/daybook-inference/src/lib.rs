//! # daybook-inference
//!
//! Model-serving backend abstraction for daybook.
//!
//! This crate provides:
//! - Ollama implementation of the embedding and generation traits (default)
//! - A deterministic mock backend for tests (feature `mock`)
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable the Ollama backend
//! - `mock`: Enable the deterministic mock backend
//!
//! # Example
//!
//! ```rust,no_run
//! use daybook_inference::OllamaBackend;
//! use daybook_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaBackend::from_env();
//!     let vector = backend.embed("Hello").await.unwrap();
//!     assert_eq!(vector.as_slice().len(), backend.dimension());
//! }
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use daybook_core::*;

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockBackend;
