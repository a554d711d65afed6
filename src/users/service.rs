use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::jwt::TokenKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::state::AppState;
use crate::users::dto::{non_empty, SigninResponse, SignupResponse, UserPatch};
use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Email uniqueness is a lookup-before-insert check, not a storage
/// constraint; an existing match is a Conflict.
fn ensure_email_free(existing: Option<&User>) -> Result<(), AppError> {
    if let Some(user) = existing {
        warn!(email = %user.email, "signup with taken email");
        return Err(AppError::conflict("User with this email already exists."));
    }
    Ok(())
}

pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

/// Signup. `image` is the path the upload layer already stored; on any
/// failure past that point the file is released so it cannot be orphaned.
pub async fn create_user(
    state: &AppState,
    input: NewUser,
    image: Option<String>,
) -> Result<SignupResponse, AppError> {
    let Some(image) = image else {
        return Err(AppError::validation("Image file is missing."));
    };

    match create_user_checked(state, input, image.clone()).await {
        Ok(resp) => Ok(resp),
        Err(e) => {
            state.attachments.release(image);
            Err(e)
        }
    }
}

async fn create_user_checked(
    state: &AppState,
    mut input: NewUser,
    image: String,
) -> Result<SignupResponse, AppError> {
    input.email = input.email.trim().to_lowercase();

    if input.name.trim().is_empty() || input.surname.trim().is_empty() {
        return Err(AppError::validation(
            "Invalid inputs passed, please check your data.",
        ));
    }
    if !is_valid_email(&input.email) {
        return Err(AppError::validation("Invalid email."));
    }
    if input.password.len() < 8 {
        return Err(AppError::validation("Password too short."));
    }

    ensure_email_free(User::find_by_email(&state.db, &input.email).await?.as_ref())?;

    let hash = hash_password(&input.password)?;
    let user = User::create(
        &state.db,
        input.name.trim(),
        input.surname.trim(),
        &input.email,
        &hash,
        &image,
    )
    .await?;

    let token = TokenKeys::from_ref(state).sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(SignupResponse {
        user_id: user.id,
        email: user.email,
        token,
        is_admin: user.is_admin,
        image: user.image,
    })
}

/// Unknown email and wrong password both come back as `Unauthorized`; only
/// the log lines differ.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<SigninResponse, AppError> {
    let email = email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "signin with unknown email");
            return Err(AppError::Unauthorized);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "signin with invalid password");
        return Err(AppError::Unauthorized);
    }

    let token = TokenKeys::from_ref(state).sign(user.id, &user.email)?;

    info!(user_id = %user.id, "user signed in");
    Ok(SigninResponse {
        user_id: user.id,
        email: user.email,
        token,
        is_admin: user.is_admin,
    })
}

pub async fn get_by_id(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))
}

/// Partial update. Replacing the image releases the old file best-effort; a
/// failed save releases the freshly uploaded file instead.
pub async fn update_user(
    state: &AppState,
    user_id: Uuid,
    patch: UserPatch,
    new_image: Option<String>,
) -> Result<User, AppError> {
    let found = User::find_by_id(&state.db, user_id).await?;
    let Some(mut user) = found else {
        if let Some(image) = new_image {
            state.attachments.release(image);
        }
        return Err(AppError::not_found("Could not find user for provided id."));
    };

    if new_image.is_some() {
        state.attachments.release(user.image.clone());
    }

    patch.apply(&mut user);
    if let Some(password) = non_empty(&patch.password) {
        user.password_hash = hash_password(&password)?;
    }
    if let Some(image) = &new_image {
        user.image = image.clone();
    }

    match user.save(&state.db).await {
        Ok(saved) => {
            info!(user_id = %saved.id, "user updated");
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

/// Existence is confirmed, then the image release is kicked off, then the row
/// goes. If the row delete fails after the release the file is already gone;
/// there is no rollback.
pub async fn delete_user(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;

    state.attachments.release(user.image.clone());

    let rows = User::delete_by_id(&state.db, user_id).await?;
    if rows == 0 {
        return Err(AppError::not_found("User not found."));
    }

    info!(user_id = %user_id, "user deleted");
    Ok(())
}

pub async fn list_all(state: &AppState) -> Result<Vec<User>, AppError> {
    Ok(User::list_all(&state.db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use time::OffsetDateTime;

    fn ann() -> User {
        User {
            id: Uuid::new_v4(),
            is_admin: false,
            name: "Ann".into(),
            surname: "Nowak".into(),
            email: "ann@example.com".into(),
            password_hash: "hash".into(),
            image: "uploads/images/ann.png".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn second_signup_with_same_email_conflicts() {
        // Lookup-before-insert modeled over the store: the first signup sees
        // no match, the second sees the row the first created.
        let mut users: HashMap<String, User> = HashMap::new();
        let user = ann();

        assert!(ensure_email_free(users.get(&user.email)).is_ok());
        users.insert(user.email.clone(), user.clone());

        let second = ensure_email_free(users.get(&user.email));
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn email_regex_accepts_plausible_addresses() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.pl"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
