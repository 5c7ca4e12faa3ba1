use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};

use crate::core::app_state::AppState;

/// Handler: GET /health
///
/// Always 200; `ok` in the body says whether the model backend answered.
pub async fn health_route<G>(State(state): State<Arc<AppState<G>>>) -> Json<HealthStatus>
where
    G: Send + Sync,
{
    Json(state.health.check(&state.model_config).await)
}
