//! Embedding provider boundary.
//!
//! `provider` defines the trait, `fastembed_provider` the local ONNX-backed
//! implementation, and `mock` a deterministic embedder for tests.

mod fastembed_provider;
mod mock;
mod provider;

pub use fastembed_provider::FastEmbedProvider;
pub use mock::MockEmbedder;
pub use provider::EmbeddingProvider;
