use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use ai_llm_service::{HealthService, LlmService, TextGenerator, config_from_env};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

use crate::{
    middleware_layer::json_error_mapper::json_error_mapper,
    routes::{health::health_route::health_route, recipes::recipes_route::suggest_recipes_route},
};

/// Listen address used when `API_ADDRESS` is unset.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// Builds the HTTP router over any text generator.
pub fn router<G>(state: Arc<AppState<G>>) -> Router
where
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/api/recipes", post(suggest_recipes_route::<G>))
        .route("/health", get(health_route::<G>))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Loads config from the environment and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let model_config = config_from_env()?;
    let llm = LlmService::new(model_config.clone())?;
    let health = HealthService::new(Some(10))?;
    let state = Arc::new(AppState::new(llm, model_config, health));

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "recipe API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("recipe API stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
