mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

use crate::state::AppState;
use axum::{routing::patch, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/recipes/:recipe_id", patch(handlers::update_recipe))
}
