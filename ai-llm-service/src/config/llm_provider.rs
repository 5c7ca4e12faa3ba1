use std::fmt;

/// Represents the provider (backend) used for model inference.
///
/// `OpenAI` covers every endpoint speaking the OpenAI chat-completions
/// protocol, which includes Fireworks.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// fn describe(provider: LlmProvider) -> &'static str {
///     match provider {
///         LlmProvider::Ollama => "local Ollama runtime",
///         LlmProvider::OpenAI => "OpenAI-compatible API",
///     }
/// }
/// assert_eq!(describe(LlmProvider::Ollama), "local Ollama runtime");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI chat-completions protocol (OpenAI, Fireworks, ...).
    OpenAI,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Ollama => f.write_str("ollama"),
            LlmProvider::OpenAI => f.write_str("openai"),
        }
    }
}
