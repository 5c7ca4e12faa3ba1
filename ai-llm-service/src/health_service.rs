//! Health probe for the configured model backend.
//!
//! - Ollama: `GET {endpoint}/api/tags` (model must be pulled locally)
//! - OpenAI-compatible: `GET {endpoint}/v1/models` with Bearer auth
//!
//! [`HealthService::check`] never fails: any error is reported as
//! `HealthStatus { ok: false, .. }`, which is what a `/health` route wants.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, ProviderError, ProviderErrorKind, Result, make_snippet,
    },
};

/// A serializable health snapshot for the model backend.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend protocol (`ollama` / `openai`).
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier that was looked up.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Probe latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable detail.
    pub message: String,
}

/// Reusable health checker with its own short-timeout HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a checker with the given timeout (defaults to 10s).
    ///
    /// # Errors
    /// [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Probes `cfg`, mapping every failure into `ok = false`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.probe_openai(cfg).await,
        };
        let latency_ms = started.elapsed().as_millis();

        let (ok, message) = match result {
            Ok(true) => (true, "model available".to_string()),
            Ok(false) => (false, format!("model `{}` not listed by provider", cfg.model)),
            Err(e) => {
                warn!(provider = %cfg.provider, error = %e, "health probe failed");
                (false, e.to_string())
            }
        };
        debug!(provider = %cfg.provider, ok, latency_ms, "health probe finished");

        HealthStatus {
            provider: cfg.provider.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message,
        }
    }

    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<bool> {
        let url = format!("{}/api/tags", cfg.base_url());
        let resp = self.client.get(&url).send().await?;
        let tags: OllamaTags = decode(LlmProvider::Ollama, url, resp).await?;
        // Ollama lists `name:tag`; a bare name means `:latest`.
        let wanted = if cfg.model.contains(':') {
            cfg.model.clone()
        } else {
            format!("{}:latest", cfg.model)
        };
        Ok(tags.models.iter().any(|m| m.name == wanted))
    }

    async fn probe_openai(&self, cfg: &LlmModelConfig) -> Result<bool> {
        let url = format!("{}/v1/models", cfg.base_url());
        let mut req = self.client.get(&url);
        if let Some(key) = &cfg.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let list: OpenAiModels = decode(LlmProvider::OpenAI, url, resp).await?;
        Ok(list.data.iter().any(|m| m.id == cfg.model))
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(
    provider: LlmProvider,
    url: String,
    resp: reqwest::Response,
) -> Result<T> {
    if !resp.status().is_success() {
        let status = resp.status();
        let snippet = make_snippet(&resp.text().await.unwrap_or_default());
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::HttpStatus(HttpError { status, url, snippet }),
        )
        .into());
    }
    resp.json::<T>().await.map_err(|e| {
        AiLlmError::from(ProviderError::new(
            provider,
            ProviderErrorKind::Decode(e.to_string()),
        ))
    })
}

#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiModels {
    #[serde(default)]
    data: Vec<OpenAiModel>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
}
