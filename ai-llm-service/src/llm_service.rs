//! Shared model service used by the HTTP layer.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Holds exactly one provider client, chosen by [`LlmModelConfig::provider`].
//! - Stateless per request: no conversation memory, no response cache.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{LlmService, TextGenerator, config_from_env};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmService::new(config_from_env()?)?);
//! let text = svc.generate("Name one dish with eggs.", None).await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use tracing::info;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::Result,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
    structured_output::{OutputFormat, TextGenerator},
};

#[derive(Debug)]
enum Backend {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

/// Provider-agnostic text generation over the configured model.
#[derive(Debug)]
pub struct LlmService {
    cfg: LlmModelConfig,
    backend: Backend,
}

impl LlmService {
    /// Builds the provider client for `cfg`.
    ///
    /// # Errors
    /// Whatever the provider constructor rejects (endpoint, key, HTTP client).
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        let backend = match cfg.provider {
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI => Backend::OpenAI(OpenAiService::new(cfg.clone())?),
        };

        info!(provider = %cfg.provider, model = %cfg.model, "LlmService ready");
        Ok(Self { cfg, backend })
    }

    /// The configuration this service was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }
}

impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str, format: Option<OutputFormat<'_>>) -> Result<String> {
        match &self.backend {
            Backend::Ollama(cli) => cli.generate(prompt, format.map(|f| f.schema)).await,
            Backend::OpenAI(cli) => cli.generate(prompt, format).await,
        }
    }
}
