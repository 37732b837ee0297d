//! Legal Mitra - question answering over Indian statutes
//!
//! Questions are embedded, matched against a partitioned vector index holding
//! one namespace per legal act, re-ranked with section-aware heuristics and
//! answered by a hosted LLM that cites the retrieved sections.

pub mod assistant;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod intent;
pub mod llm;
pub mod patterns;
pub mod retrieval;

pub use error::{MitraError, Result};
