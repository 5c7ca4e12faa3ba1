//! Model boundary for Chef AI.
//!
//! The crate hides the hosted model behind a single request/response call:
//! a prompt plus a target schema goes in, a decoded and checked value (or an
//! [`AiLlmError`]) comes out. Providers are reached over plain HTTP:
//!
//! - **Ollama** via `/api/generate`
//! - **OpenAI-compatible** endpoints (OpenAI, Fireworks) via `/v1/chat/completions`
//!
//! Providers that cannot enforce a JSON schema natively are driven in text
//! mode; [`structured_output::generate_object`] then extracts and validates
//! the object locally.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod structured_output;
pub mod telemetry;

pub use config::{
    default_config::config_from_env, llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, SchemaError};
pub use health_service::{HealthService, HealthStatus};
pub use llm_service::LlmService;
pub use structured_output::{
    ObjectRequest, OutputFormat, SchemaContract, SchemaViolation, TextGenerator, generate_object,
};
