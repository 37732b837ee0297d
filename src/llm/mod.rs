//! Answer generation from ranked sections

mod gemini;
mod prompt;

pub use gemini::GeminiClient;
pub use prompt::{build_context, build_prompt};
pub(crate) use prompt::non_empty_or;

use crate::retrieval::Hit;
use std::future::Future;
use thiserror::Error;

/// Answer returned when the model call fails
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I encountered an error while generating the response. Please try again.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("API key environment variable {env} is not set")]
    MissingApiKey { env: String },

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Produces the final natural-language answer
pub trait AnswerGenerator: Send + Sync {
    /// Answer `question` from `documents`; never fails, falling back to
    /// [`FALLBACK_ANSWER`] text instead
    fn generate_answer(
        &self,
        question: &str,
        documents: &[Hit],
    ) -> impl Future<Output = String> + Send;

    fn model_name(&self) -> &str;
}
