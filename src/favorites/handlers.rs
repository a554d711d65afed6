use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::AppError, favorites::service, state::AppState};

/// POST /users/:user_id/favorites/:recipe_id
#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path((user_id, recipe_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    service::add_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(json!({
        "message": format!("Recipe {recipe_id} added to favorites for user {user_id}")
    })))
}

/// DELETE /users/:user_id/favorites/:recipe_id
#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path((user_id, recipe_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    service::remove_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(json!({
        "message": format!("Recipe {recipe_id} removed from favorites for user {user_id}")
    })))
}

/// GET /users/:user_id/favorites
#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let favorites = service::list_favorites(&state, user_id).await?;
    Ok(Json(json!({ "favorites": favorites })))
}

/// GET /users/:user_id/favorites/:recipe_id
#[instrument(skip(state))]
pub async fn get_favorite(
    State(state): State<AppState>,
    Path((user_id, recipe_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let favorite = service::get_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(json!({ "favorite": favorite })))
}
