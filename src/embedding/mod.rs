/// Query embedding
///
/// The assistant embeds each question once; the vector is handed to the
/// retrieval core. Documents are embedded by the (external) indexing pipeline.
mod provider;

pub use provider::{normalize, EmbeddingError, EmbeddingProvider, FastEmbedProvider};
