use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// What the user typed. Both fields default to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub preferences: String,
}

impl RecipeQuery {
    pub fn new(ingredients: impl Into<String>, preferences: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            preferences: preferences.into(),
        }
    }
}

/// One suggested recipe.
///
/// An empty `title` decodes fine but never passes [`RecipeSet`] validation;
/// renderers fall back to a placeholder for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub title: String,

    #[serde(
        default,
        deserialize_with = "whole_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_minutes: Option<u64>,

    #[serde(default)]
    pub uses: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
}

/// Model response envelope: 1 to 6 recipes plus an optional shopping list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSet {
    pub recipes: Vec<Recipe>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shopping_list: Vec<String>,
}

/// Accepts non-negative integers, including JSON floats with no fractional
/// part (`10.0`), since models emit both.
fn whole_minutes<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };

    let minutes = match &value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    };

    minutes
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("time_minutes must be a non-negative integer, got {value}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_fields_default_to_empty() {
        let q: RecipeQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(q, RecipeQuery::default());

        let q: RecipeQuery = serde_json::from_value(json!({ "ingredients": "rice" })).unwrap();
        assert_eq!(q.ingredients, "rice");
        assert_eq!(q.preferences, "");
    }

    #[test]
    fn optional_recipe_fields_default_to_empty() {
        let r: Recipe = serde_json::from_value(json!({ "title": "Toast", "extra": true })).unwrap();
        assert_eq!(r.title, "Toast");
        assert_eq!(r.time_minutes, None);
        assert!(r.uses.is_empty() && r.missing.is_empty() && r.steps.is_empty());
    }

    #[test]
    fn minutes_accept_whole_numbers_only() {
        let ok: Recipe = serde_json::from_value(json!({ "title": "a", "time_minutes": 15.0 })).unwrap();
        assert_eq!(ok.time_minutes, Some(15));

        let null: Recipe = serde_json::from_value(json!({ "title": "a", "time_minutes": null })).unwrap();
        assert_eq!(null.time_minutes, None);

        let long: Recipe =
            serde_json::from_value(json!({ "title": "a", "time_minutes": 5_000_000_000u64 })).unwrap();
        assert_eq!(long.time_minutes, Some(5_000_000_000));

        for bad in [json!(-1), json!(2.5), json!("10")] {
            let res = serde_json::from_value::<Recipe>(json!({ "title": "a", "time_minutes": bad }));
            assert!(res.is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn shopping_list_is_omitted_when_empty() {
        let set = RecipeSet {
            recipes: vec![Recipe {
                title: "Egg Rice".into(),
                time_minutes: Some(10),
                uses: vec!["rice".into(), "egg".into()],
                ..Recipe::default()
            }],
            shopping_list: Vec::new(),
        };
        let v = serde_json::to_value(&set).unwrap();
        assert!(v.get("shopping_list").is_none());
        assert_eq!(v["recipes"][0]["time_minutes"], 10);
        assert!(v["recipes"][0].get("steps").is_none());
    }
}
