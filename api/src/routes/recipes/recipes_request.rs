use recipe_chef::RecipeQuery;
use serde::Deserialize;

/// Request payload for `POST /api/recipes`.
///
/// Absent and `null` fields both mean "empty".
#[derive(Debug, Default, Deserialize)]
pub struct SuggestRecipesRequest {
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub preferences: Option<String>,
}

impl From<SuggestRecipesRequest> for RecipeQuery {
    fn from(req: SuggestRecipesRequest) -> Self {
        RecipeQuery::new(
            req.ingredients.unwrap_or_default(),
            req.preferences.unwrap_or_default(),
        )
    }
}
