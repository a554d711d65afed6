use serde::Deserialize;

use crate::recipes::repo::Recipe;
use crate::users::dto::non_empty;

/// Ingredients arrive either as a structured list or as one comma-delimited
/// string (the legacy form encoding).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IngredientsInput {
    List(Vec<String>),
    Text(String),
}

impl IngredientsInput {
    pub fn parse(self) -> Vec<String> {
        let items = match self {
            IngredientsInput::List(items) => items,
            IngredientsInput::Text(text) => {
                text.split(',').map(|s| s.to_string()).collect()
            }
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Partial recipe update; same keep-on-empty policy as the user patch.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    pub name: Option<String>,
    pub ingredients: Option<IngredientsInput>,
    pub instructions: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
    pub seasonality: Option<String>,
    pub special_diet: Option<String>,
}

impl RecipePatch {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(v) = non_empty(&self.name) {
            recipe.name = v;
        }
        if let Some(input) = self.ingredients {
            let parsed = input.parse();
            if !parsed.is_empty() {
                recipe.ingredients = parsed;
            }
        }
        if let Some(v) = non_empty(&self.instructions) {
            recipe.instructions = v;
        }
        if let Some(v) = non_empty(&self.time) {
            recipe.time = v;
        }
        if let Some(v) = non_empty(&self.category) {
            recipe.category = v;
        }
        if let Some(v) = non_empty(&self.cuisine) {
            recipe.cuisine = v;
        }
        if let Some(v) = non_empty(&self.difficulty) {
            recipe.difficulty = v;
        }
        if let Some(v) = non_empty(&self.seasonality) {
            recipe.seasonality = v;
        }
        if let Some(v) = non_empty(&self.special_diet) {
            recipe.special_diet = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn pierogi() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: "Pierogi".into(),
            ingredients: vec!["flour".into(), "water".into()],
            instructions: "Knead, fill, boil.".into(),
            time: "90 min".into(),
            category: "main".into(),
            cuisine: "polish".into(),
            difficulty: "medium".into(),
            seasonality: "all".into(),
            special_diet: "none".into(),
            image: Some("uploads/images/p.png".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn delimited_string_is_split_and_trimmed() {
        let parsed = IngredientsInput::Text("flour , water,  salt".into()).parse();
        assert_eq!(parsed, vec!["flour", "water", "salt"]);
    }

    #[test]
    fn structured_list_passes_through_trimmed() {
        let parsed =
            IngredientsInput::List(vec![" flour ".into(), "water".into(), "".into()]).parse();
        assert_eq!(parsed, vec!["flour", "water"]);
    }

    #[test]
    fn untagged_deserialization_handles_both_shapes() {
        let from_list: IngredientsInput =
            serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(from_list.parse(), vec!["a", "b"]);

        let from_text: IngredientsInput = serde_json::from_str(r#""a, b""#).unwrap();
        assert_eq!(from_text.parse(), vec!["a", "b"]);
    }

    #[test]
    fn patch_keeps_unset_and_empty_fields() {
        let mut recipe = pierogi();
        let patch = RecipePatch {
            name: Some("".into()),
            cuisine: Some("silesian".into()),
            ingredients: Some(IngredientsInput::Text("  ".into())),
            ..Default::default()
        };
        patch.apply(&mut recipe);
        assert_eq!(recipe.name, "Pierogi");
        assert_eq!(recipe.cuisine, "silesian");
        assert_eq!(recipe.ingredients, vec!["flour", "water"]);
    }

    #[test]
    fn patch_replaces_ingredients_when_provided() {
        let mut recipe = pierogi();
        let patch = RecipePatch {
            ingredients: Some(IngredientsInput::Text("potato, cheese, onion".into())),
            ..Default::default()
        };
        patch.apply(&mut recipe);
        assert_eq!(recipe.ingredients, vec!["potato", "cheese", "onion"]);
    }
}
