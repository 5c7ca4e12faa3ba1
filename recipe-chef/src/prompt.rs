//! Prompt builder: persona, task, output shape, then the raw user input.

use crate::model::RecipeQuery;

/// Persona and task framing.
pub const PERSONA: &str = "You are Dobby Chef AI. Given the user's ingredients and preferences,
suggest 3–6 simple recipes. Steps should be short and clear.";

/// Output shape spelled out for models without native schema support.
pub const OUTPUT_SHAPE: &str = r#"Return ONLY valid JSON that matches this shape:
{
  "recipes": [
    { "title": string, "time_minutes"?: number, "uses"?: string[], "missing"?: string[], "steps"?: string[] }
  ],
  "shopping_list"?: string[]
}

Do not include extra keys or prose. Output JSON only. Do not use full stop anywhere"#;

/// Build the single instruction sent to the model.
///
/// User input is interpolated verbatim, untrimmed and unescaped.
///
/// # Example
/// ```
/// # use recipe_chef::{RecipeQuery, build_prompt};
/// let prompt = build_prompt(&RecipeQuery::new("rice, egg", "quick"));
/// assert!(prompt.ends_with("Ingredients: rice, egg\nPreferences: quick\n"));
/// ```
pub fn build_prompt(query: &RecipeQuery) -> String {
    let mut out = String::with_capacity(
        PERSONA.len() + OUTPUT_SHAPE.len() + query.ingredients.len() + query.preferences.len() + 40,
    );
    out.push('\n');
    out.push_str(PERSONA);
    out.push_str("\n\n");
    out.push_str(OUTPUT_SHAPE);
    out.push('\n');
    out.push_str("Ingredients: ");
    out.push_str(&query.ingredients);
    out.push('\n');
    out.push_str("Preferences: ");
    out.push_str(&query.preferences);
    out.push('\n');
    out
}
