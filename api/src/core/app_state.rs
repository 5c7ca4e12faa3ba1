use ai_llm_service::{HealthService, LlmModelConfig};

/// Shared state for all HTTP handlers.
///
/// Nothing here is mutated per request, so concurrent sessions never share
/// mutable state.
pub struct AppState<G> {
    /// Model boundary used to generate recipes.
    pub llm: G,
    /// Configuration the boundary was built from (reported by `/health`).
    pub model_config: LlmModelConfig,
    /// Probe for the `/health` route.
    pub health: HealthService,
}

impl<G> AppState<G> {
    pub fn new(llm: G, model_config: LlmModelConfig, health: HealthService) -> Self {
        Self {
            llm,
            model_config,
            health,
        }
    }
}
