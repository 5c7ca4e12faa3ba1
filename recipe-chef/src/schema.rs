//! Declared contract between the model output and the rest of the system.

use ai_llm_service::{SchemaContract, SchemaViolation};
use serde_json::{Value, json};

use crate::model::RecipeSet;

pub const MIN_RECIPES: usize = 1;
pub const MAX_RECIPES: usize = 6;

impl SchemaContract for RecipeSet {
    const NAME: &'static str = "RecipeSet";

    fn json_schema() -> Value {
        let strings = json!({ "type": "array", "items": { "type": "string" } });
        json!({
            "type": "object",
            "properties": {
                "recipes": {
                    "type": "array",
                    "minItems": MIN_RECIPES,
                    "maxItems": MAX_RECIPES,
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "time_minutes": { "type": "integer", "minimum": 0 },
                            "uses": strings,
                            "missing": strings,
                            "steps": strings
                        },
                        "required": ["title"]
                    }
                },
                "shopping_list": strings
            },
            "required": ["recipes"]
        })
    }

    fn check(&self) -> Result<(), SchemaViolation> {
        let n = self.recipes.len();
        if !(MIN_RECIPES..=MAX_RECIPES).contains(&n) {
            return Err(SchemaViolation::new(
                "recipes",
                format!("expected {MIN_RECIPES} to {MAX_RECIPES} recipes, got {n}"),
            ));
        }

        if let Some(i) = self.recipes.iter().position(|r| r.title.is_empty()) {
            return Err(SchemaViolation::new(
                format!("recipes[{i}].title"),
                "must not be empty",
            ));
        }

        Ok(())
    }
}
