use sqlx::PgPool;
use uuid::Uuid;

use crate::recipes::repo::Recipe;

/// The user↔recipe bookmark relation, one row per (user, recipe) pair. The
/// primary key gives set semantics; there is deliberately no foreign key to
/// recipes, so rows can dangle when a recipe is deleted out-of-band.
pub struct Favorites;

impl Favorites {
    pub async fn add(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(recipe_id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Rows affected; zero when the pair was not present.
    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> sqlx::Result<u64> {
        let result =
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
                .bind(user_id)
                .bind(recipe_id)
                .execute(db)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn contains(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> sqlx::Result<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            "SELECT recipe_id FROM favorites WHERE user_id = $1 AND recipe_id = $2",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(db)
        .await?;
        Ok(found.is_some())
    }

    /// Resolves the relation to full recipes. The inner join silently drops
    /// references whose recipe no longer exists.
    pub async fn list_recipes(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Recipe>> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.name, r.ingredients, r.instructions, r.time, r.category,
                   r.cuisine, r.difficulty, r.seasonality, r.special_diet, r.image,
                   r.created_at
              FROM favorites f
              JOIN recipes r ON r.id = f.recipe_id
             WHERE f.user_id = $1
             ORDER BY f.added_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
