//! POST /api/recipes: recipe suggestions from free-text ingredients.

use std::sync::Arc;

use ai_llm_service::TextGenerator;
use axum::{Json, extract::State, http::HeaderMap};
use recipe_chef::{RecipeQuery, RecipeSet, suggest_recipes};
use tracing::{debug, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::json_error_mapper::REQUEST_ID_HEADER,
    routes::recipes::recipes_request::SuggestRecipesRequest,
};

/// Handler: POST /api/recipes
///
/// 200 with a validated `RecipeSet`, or 500 with `{ "error": ... }` for any
/// upstream or validation failure.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/recipes \
///   -H 'content-type: application/json' \
///   -d '{"ingredients":"rice, egg","preferences":"quick"}'
/// ```
#[instrument(name = "suggest_recipes_route", skip_all)]
pub async fn suggest_recipes_route<G>(
    State(state): State<Arc<AppState<G>>>,
    headers: HeaderMap,
    Json(body): Json<SuggestRecipesRequest>,
) -> AppResult<Json<RecipeSet>>
where
    G: TextGenerator + 'static,
{
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    let query = RecipeQuery::from(body);
    debug!(%request_id, ingredients = %query.ingredients, preferences = %query.preferences, "suggesting recipes");

    let set = suggest_recipes(&state.llm, &query).await?;
    Ok(Json(set))
}
