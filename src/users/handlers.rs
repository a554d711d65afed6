use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    state::AppState,
    users::{
        dto::{SigninRequest, SigninResponse, SignupResponse, UserPatch},
        service::{self, NewUser},
    },
};

fn bad_field(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(format!("Malformed form field: {e}"))
}

async fn store_upload(
    state: &AppState,
    upload: Option<(Bytes, String)>,
) -> Result<Option<String>, AppError> {
    match upload {
        Some((body, content_type)) => {
            let path = state
                .files
                .save(body, &content_type)
                .await
                .map_err(|e| AppError::Files(e.to_string()))?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

/// POST /signup — multipart form: name, surname, email, password, image file.
#[instrument(skip(state, mp))]
pub async fn signup(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let mut input = NewUser {
        name: String::new(),
        surname: String::new(),
        email: String::new(),
        password: String::new(),
    };
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
            "name" => input.name = field.text().await.map_err(bad_field)?,
            "surname" => input.surname = field.text().await.map_err(bad_field)?,
            "email" => input.email = field.text().await.map_err(bad_field)?,
            "password" => input.password = field.text().await.map_err(bad_field)?,
            _ => {}
        }
    }

    let image = store_upload(&state, upload).await?;
    let resp = service::create_user(&state, input, image).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /signin — json body.
#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let resp = service::authenticate(&state, &payload.email, &payload.password).await?;
    Ok(Json(resp))
}

/// GET /users/:user_id
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user = service::get_by_id(&state, user_id).await?;
    Ok(Json(json!({ "user": user })))
}

/// PATCH /users/:user_id — multipart form, every field optional.
#[instrument(skip(state, mp))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut patch = UserPatch::default();
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
            "isAdmin" => {
                let text = field.text().await.map_err(bad_field)?;
                patch.is_admin = text.parse::<bool>().ok();
            }
            "name" => patch.name = Some(field.text().await.map_err(bad_field)?),
            "surname" => patch.surname = Some(field.text().await.map_err(bad_field)?),
            "email" => patch.email = Some(field.text().await.map_err(bad_field)?),
            "password" => patch.password = Some(field.text().await.map_err(bad_field)?),
            _ => {}
        }
    }

    let new_image = store_upload(&state, upload).await?;
    let user = service::update_user(&state, user_id, patch, new_image).await?;
    Ok(Json(json!({ "user": user })))
}

/// DELETE /users/:user_id
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    service::delete_user(&state, user_id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// GET /users
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = service::list_all(&state).await?;
    Ok(Json(json!({ "users": users })))
}
