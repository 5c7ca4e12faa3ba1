//! Model config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `LLM_KIND`         = `fireworks` (default), `openai` or `ollama`
//! - `LLM_MODEL`        = model id (required for `openai`)
//! - `LLM_URL`          = endpoint base URL (defaults per provider)
//! - `LLM_API_KEY`      = bearer token; falls back to `FIREWORKS_API_KEY`
//!   or `OPENAI_API_KEY` depending on the provider
//! - `LLM_MAX_TOKENS`   = optional generation cap (u32)
//! - `LLM_TEMPERATURE`  = optional sampling temperature (0.0..=2.0)
//! - `LLM_TOP_P`        = optional nucleus sampling cutoff (0.0..=1.0)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64); unset means no timeout

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        ConfigError, Result, env_opt_f32, env_opt_u32, env_opt_u64, must_env, opt_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const FIREWORKS_ENDPOINT: &str = "https://api.fireworks.ai/inference";
pub const FIREWORKS_MODEL: &str =
    "accounts/sentientfoundation/models/dobby-unhinged-llama-3-3-70b-new";
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3.1:8b";

/// Builds the model config from the process environment.
///
/// # Errors
/// Any [`ConfigError`] raised by [`config_from_source`].
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from_source(|name| std::env::var(name).ok())
}

/// Builds the model config from an arbitrary variable source.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::MissingVar`] when a hosted provider has no API key,
///   or `openai` has no `LLM_MODEL`
/// - [`ConfigError::InvalidFormat`] when `LLM_URL` is not http(s)
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for numeric knobs
pub fn config_from_source<F>(get: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = opt_env(&get, "LLM_KIND").unwrap_or_else(|| "fireworks".to_string());

    let (provider, default_endpoint, default_model, key_fallback) =
        match kind.trim().to_ascii_lowercase().as_str() {
            "fireworks" => (
                LlmProvider::OpenAI,
                FIREWORKS_ENDPOINT,
                Some(FIREWORKS_MODEL),
                Some("FIREWORKS_API_KEY"),
            ),
            "openai" => (
                LlmProvider::OpenAI,
                OPENAI_ENDPOINT,
                None,
                Some("OPENAI_API_KEY"),
            ),
            "ollama" => (
                LlmProvider::Ollama,
                OLLAMA_ENDPOINT,
                Some(OLLAMA_MODEL),
                None,
            ),
            other => return Err(ConfigError::UnsupportedProvider(other.to_string()).into()),
        };

    let endpoint = opt_env(&get, "LLM_URL").unwrap_or_else(|| default_endpoint.to_string());
    validate_http_endpoint("LLM_URL", &endpoint)?;

    let model = match default_model {
        Some(d) => opt_env(&get, "LLM_MODEL").unwrap_or_else(|| d.to_string()),
        None => must_env(&get, "LLM_MODEL")?,
    };

    let api_key = opt_env(&get, "LLM_API_KEY").or_else(|| key_fallback.and_then(|k| opt_env(&get, k)));
    if provider == LlmProvider::OpenAI && api_key.is_none() {
        return Err(ConfigError::MissingVar("LLM_API_KEY").into());
    }

    let temperature = env_opt_f32(&get, "LLM_TEMPERATURE")?;
    if let Some(t) = temperature {
        validate_range_f32("LLM_TEMPERATURE", t, 0.0, 2.0)?;
    }
    let top_p = env_opt_f32(&get, "LLM_TOP_P")?;
    if let Some(p) = top_p {
        validate_range_f32("LLM_TOP_P", p, 0.0, 1.0)?;
    }

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: env_opt_u32(&get, "LLM_MAX_TOKENS")?,
        temperature,
        top_p,
        timeout_secs: env_opt_u64(&get, "LLM_TIMEOUT_SECS")?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error_handler::AiLlmError;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn fireworks_is_the_default_provider() {
        let cfg = config_from_source(source(&[("FIREWORKS_API_KEY", "fw-key")])).unwrap();
        assert_eq!(cfg.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.endpoint, FIREWORKS_ENDPOINT);
        assert_eq!(cfg.model, FIREWORKS_MODEL);
        assert_eq!(cfg.api_key.as_deref(), Some("fw-key"));
        assert_eq!(cfg.timeout_secs, None);
    }

    #[test]
    fn hosted_provider_requires_a_key() {
        let err = config_from_source(source(&[])).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("LLM_API_KEY"))
        ));
    }

    #[test]
    fn ollama_needs_no_key() {
        let cfg = config_from_source(source(&[
            ("LLM_KIND", "Ollama"),
            ("LLM_MODEL", "qwen3:14b"),
            ("LLM_MAX_TOKENS", "512"),
            ("LLM_TIMEOUT_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(cfg.provider, LlmProvider::Ollama);
        assert_eq!(cfg.endpoint, OLLAMA_ENDPOINT);
        assert_eq!(cfg.model, "qwen3:14b");
        assert_eq!(cfg.max_tokens, Some(512));
        assert_eq!(cfg.timeout_secs, Some(90));
    }

    #[test]
    fn ollama_has_a_default_model() {
        let cfg = config_from_source(source(&[("LLM_KIND", "ollama")])).unwrap();
        assert_eq!(cfg.model, OLLAMA_MODEL);
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn top_p_is_read_and_bounded() {
        let cfg = config_from_source(source(&[("LLM_KIND", "ollama"), ("LLM_TOP_P", "0.9")])).unwrap();
        assert_eq!(cfg.top_p, Some(0.9));
        assert_eq!(
            config_from_source(source(&[("LLM_KIND", "ollama")])).unwrap().top_p,
            None
        );

        let err = config_from_source(source(&[("LLM_KIND", "ollama"), ("LLM_TOP_P", "1.5")]))
            .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::OutOfRange { field: "LLM_TOP_P", .. })
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let err = config_from_source(source(&[("LLM_KIND", "bard")])).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::UnsupportedProvider(_))
        ));

        let err = config_from_source(source(&[("LLM_KIND", "ollama"), ("LLM_URL", "localhost")]))
            .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidFormat { var: "LLM_URL", .. })
        ));

        let err = config_from_source(source(&[
            ("LLM_KIND", "ollama"),
            ("LLM_TEMPERATURE", "7.5"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::OutOfRange { .. })
        ));

        let err = config_from_source(source(&[
            ("LLM_KIND", "ollama"),
            ("LLM_MAX_TOKENS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn openai_requires_model_name() {
        let err = config_from_source(source(&[("LLM_KIND", "openai"), ("OPENAI_API_KEY", "sk")]))
            .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("LLM_MODEL"))
        ));
    }
}
