use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::favorites::repo::Favorites;
use crate::recipes::repo::Recipe;
use crate::state::AppState;
use crate::users::repo::User;

async fn require_user(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    User::find_by_id(&state.db, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("User not found."))
}

/// Set semantics: a pair may be added once.
fn ensure_not_favorite(already_favorite: bool) -> Result<(), AppError> {
    if already_favorite {
        return Err(AppError::conflict("Recipe already in favorites."));
    }
    Ok(())
}

/// The membership check and the insert are not atomic; the primary key folds
/// a racing insert into the same Conflict.
fn map_insert_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::conflict("Recipe already in favorites.")
        }
        other => other.into(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Removal {
    Removed,
    AlreadyAbsent,
}

/// Removing an absent pair is a no-op, never an error.
fn classify_removal(rows_removed: u64) -> Removal {
    if rows_removed == 0 {
        Removal::AlreadyAbsent
    } else {
        Removal::Removed
    }
}

/// Recipe first, then user, then set membership: the order callers observe.
pub async fn add_favorite(
    state: &AppState,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<(), AppError> {
    if Recipe::find_by_id(&state.db, recipe_id).await?.is_none() {
        return Err(AppError::not_found("Recipe not found."));
    }
    require_user(state, user_id).await?;

    ensure_not_favorite(Favorites::contains(&state.db, user_id, recipe_id).await?)?;

    Favorites::add(&state.db, user_id, recipe_id)
        .await
        .map_err(map_insert_error)?;

    info!(%user_id, %recipe_id, "favorite added");
    Ok(())
}

/// Idempotent: removing an absent favorite succeeds as a no-op.
pub async fn remove_favorite(
    state: &AppState,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<(), AppError> {
    require_user(state, user_id).await?;

    let removed = Favorites::remove(&state.db, user_id, recipe_id).await?;
    match classify_removal(removed) {
        Removal::AlreadyAbsent => info!(%user_id, %recipe_id, "favorite already absent"),
        Removal::Removed => info!(%user_id, %recipe_id, "favorite removed"),
    }
    Ok(())
}

pub async fn list_favorites(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<Recipe>, AppError> {
    require_user(state, user_id).await?;
    Ok(Favorites::list_recipes(&state.db, user_id).await?)
}

/// One outward NotFound for three distinct causes; the logs tell them apart.
pub async fn get_favorite(
    state: &AppState,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<Recipe, AppError> {
    require_user(state, user_id).await?;

    if !Favorites::contains(&state.db, user_id, recipe_id).await? {
        warn!(%user_id, %recipe_id, "recipe not in user's favorites");
        return Err(AppError::not_found(
            "Favorite recipe not found for this user.",
        ));
    }

    match Recipe::find_by_id(&state.db, recipe_id).await? {
        Some(recipe) => Ok(recipe),
        None => {
            warn!(%user_id, %recipe_id, "favorite references a deleted recipe");
            Err(AppError::not_found(
                "Favorite recipe not found for this user.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn add_twice_yields_one_success_one_conflict() {
        // The relation modeled as the set it is; membership drives the check
        // exactly as `contains` does against the table.
        let mut favorites: HashSet<(Uuid, Uuid)> = HashSet::new();
        let pair = (Uuid::new_v4(), Uuid::new_v4());

        assert!(ensure_not_favorite(favorites.contains(&pair)).is_ok());
        favorites.insert(pair);

        let second = ensure_not_favorite(favorites.contains(&pair));
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn remove_twice_succeeds_both_times() {
        let mut favorites: HashSet<(Uuid, Uuid)> = HashSet::new();
        let pair = (Uuid::new_v4(), Uuid::new_v4());
        favorites.insert(pair);

        let first_rows = u64::from(favorites.remove(&pair));
        assert_eq!(classify_removal(first_rows), Removal::Removed);

        let second_rows = u64::from(favorites.remove(&pair));
        assert_eq!(classify_removal(second_rows), Removal::AlreadyAbsent);
    }

    #[test]
    fn non_unique_insert_errors_stay_storage() {
        let err = map_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Storage(_)));
    }
}
