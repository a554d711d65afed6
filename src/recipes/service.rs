use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::recipes::dto::RecipePatch;
use crate::recipes::repo::Recipe;
use crate::state::AppState;

/// Partial recipe update. The old image is released only after the new one is
/// on the saved record, so a failed save never loses the current file.
pub async fn update_recipe(
    state: &AppState,
    recipe_id: Uuid,
    patch: RecipePatch,
    new_image: Option<String>,
) -> Result<Recipe, AppError> {
    let found = Recipe::find_by_id(&state.db, recipe_id).await?;
    let Some(mut recipe) = found else {
        if let Some(image) = new_image {
            state.attachments.release(image);
        }
        return Err(AppError::not_found(
            "Could not find recipe for provided id.",
        ));
    };

    let old_image = recipe.image.clone();
    patch.apply(&mut recipe);
    if let Some(image) = &new_image {
        recipe.image = Some(image.clone());
    }

    match recipe.save(&state.db).await {
        Ok(saved) => {
            if new_image.is_some() {
                if let Some(old) = old_image {
                    state.attachments.release(old);
                }
            }
            info!(recipe_id = %saved.id, "recipe updated");
            Ok(saved)
        }
        Err(e) => {
            if let Some(image) = new_image {
                state.attachments.release(image);
            }
            Err(e.into())
        }
    }
}
