use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Recipe record. Only the mutation path and favorite lookups run through
/// this service; recipe creation and deletion belong to another deployment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub time: String,
    pub category: String,
    pub cuisine: String,
    pub difficulty: String,
    pub seasonality: String,
    pub special_diet: String,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

const RECIPE_COLUMNS: &str = "id, name, ingredients, instructions, time, category, \
     cuisine, difficulty, seasonality, special_diet, image, created_at";

impl Recipe {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Recipe>> {
        sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Whole-record write-back, mirroring the users repo: the one update path.
    pub async fn save(&self, db: &PgPool) -> sqlx::Result<Recipe> {
        sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
               SET name = $2, ingredients = $3, instructions = $4, time = $5,
                   category = $6, cuisine = $7, difficulty = $8,
                   seasonality = $9, special_diet = $10, image = $11
             WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.ingredients)
        .bind(&self.instructions)
        .bind(&self.time)
        .bind(&self.category)
        .bind(&self.cuisine)
        .bind(&self.difficulty)
        .bind(&self.seasonality)
        .bind(&self.special_diet)
        .bind(&self.image)
        .fetch_one(db)
        .await
    }
}
