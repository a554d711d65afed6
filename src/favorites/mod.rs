pub mod handlers;
pub mod repo;
pub mod service;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/favorites", get(handlers::list_favorites))
        .route(
            "/users/:user_id/favorites/:recipe_id",
            get(handlers::get_favorite)
                .post(handlers::add_favorite)
                .delete(handlers::remove_favorite),
        )
}
