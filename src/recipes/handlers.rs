use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    recipes::{
        dto::{IngredientsInput, RecipePatch},
        service,
    },
    state::AppState,
};

fn bad_field(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(format!("Malformed form field: {e}"))
}

/// PATCH /recipes/:recipe_id — multipart form, every field optional.
/// `ingredients` may repeat (structured list) or appear once as a
/// comma-delimited string.
#[instrument(skip(state, mp))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(recipe_id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut patch = RecipePatch::default();
    let mut ingredient_fields: Vec<String> = Vec::new();
    let mut upload: Option<(Bytes, String)> = None;

    loop {
        let Some(field) = mp.next_field().await.map_err(bad_field)? else {
            break;
        };
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        match name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(bad_field)?;
                upload = Some((data, content_type));
            }
            "ingredients" | "ingredients[]" => {
                ingredient_fields.push(field.text().await.map_err(bad_field)?);
            }
            "name" => patch.name = Some(field.text().await.map_err(bad_field)?),
            "instructions" => {
                patch.instructions = Some(field.text().await.map_err(bad_field)?)
            }
            "time" => patch.time = Some(field.text().await.map_err(bad_field)?),
            "category" => patch.category = Some(field.text().await.map_err(bad_field)?),
            "cuisine" => patch.cuisine = Some(field.text().await.map_err(bad_field)?),
            "difficulty" => {
                patch.difficulty = Some(field.text().await.map_err(bad_field)?)
            }
            "seasonality" => {
                patch.seasonality = Some(field.text().await.map_err(bad_field)?)
            }
            "specialDiet" => {
                patch.special_diet = Some(field.text().await.map_err(bad_field)?)
            }
            _ => {}
        }
    }

    patch.ingredients = match ingredient_fields.len() {
        0 => None,
        1 => Some(IngredientsInput::Text(ingredient_fields.remove(0))),
        _ => Some(IngredientsInput::List(ingredient_fields)),
    };

    let new_image = match upload {
        Some((body, content_type)) => Some(
            state
                .files
                .save(body, &content_type)
                .await
                .map_err(|e| AppError::Files(e.to_string()))?,
        ),
        None => None,
    };

    let recipe = service::update_recipe(&state, recipe_id, patch, new_image).await?;
    Ok(Json(json!({ "recipe": recipe })))
}
