//! Prompt builder and validator for recipe suggestions.
//!
//! Public API: [`suggest_recipes`]. It turns the user's free-text ingredients
//! and preferences into one instruction, asks the model for a [`RecipeSet`]
//! in plain text mode, and returns it only if the whole payload validates.
//! Nothing partial is ever returned.

mod error;
mod model;
mod prompt;
mod schema;

pub use error::ChefError;
pub use model::{Recipe, RecipeQuery, RecipeSet};
pub use prompt::build_prompt;
pub use schema::{MAX_RECIPES, MIN_RECIPES};

use std::time::Instant;

use ai_llm_service::{ObjectRequest, TextGenerator, generate_object};
use tracing::{info, instrument, warn};

/// Ask the model for recipe suggestions.
///
/// Exactly one call reaches `generator`; there is no retry and nothing is
/// cached. The provider is driven in text mode (`structured_outputs = false`)
/// and the reply is parsed against [`RecipeSet`] locally.
///
/// # Errors
/// - [`ChefError::Upstream`] when the model call itself fails
/// - [`ChefError::Malformed`] when the reply is not a valid [`RecipeSet`]
///
/// # Example
/// ```no_run
/// # use ai_llm_service::{LlmService, config_from_env};
/// # use recipe_chef::{RecipeQuery, suggest_recipes};
/// # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let llm = LlmService::new(config_from_env()?)?;
/// let query = RecipeQuery::new("rice, egg", "quick");
/// let set = suggest_recipes(&llm, &query).await?;
/// println!("{} recipes", set.recipes.len());
/// # Ok(()) }
/// ```
#[instrument(
    skip_all,
    fields(ingredients_len = query.ingredients.len(), preferences_len = query.preferences.len())
)]
pub async fn suggest_recipes<G>(generator: &G, query: &RecipeQuery) -> Result<RecipeSet, ChefError>
where
    G: TextGenerator,
{
    let started = Instant::now();
    let prompt = build_prompt(query);
    let request = ObjectRequest {
        prompt: &prompt,
        structured_outputs: false,
    };

    match generate_object::<RecipeSet, G>(generator, request).await {
        Ok(set) => {
            info!(
                recipes = set.recipes.len(),
                shopping_items = set.shopping_list.len(),
                latency_ms = started.elapsed().as_millis(),
                "recipes suggested"
            );
            Ok(set)
        }
        Err(e) => {
            let err = ChefError::from(e);
            warn!(error = %err, latency_ms = started.elapsed().as_millis(), "suggestion failed");
            Err(err)
        }
    }
}
