//! Typed error for the recipe-chef crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Why no recipes could be produced.
///
/// Both variants end up as the same error shape at the HTTP boundary; the
/// split exists for logs and for callers that care.
#[derive(Debug, Error)]
pub enum ChefError {
    /// The model could not be reached or answered with a provider error.
    #[error("{0}")]
    Upstream(AiLlmError),

    /// The model answered, but not with a valid recipe set.
    #[error("{0}")]
    Malformed(AiLlmError),
}

impl From<AiLlmError> for ChefError {
    fn from(err: AiLlmError) -> Self {
        if err.is_schema_mismatch() {
            ChefError::Malformed(err)
        } else {
            ChefError::Upstream(err)
        }
    }
}
