//! User services - account management

use crate::core::{
    AppError, AppJson, AppState, parse_id, require_admin, require_self_or_admin,
};
use crate::dtos::{
    CreateUserDTO, DEFAULT_PAGE_SIZE, DataResponse, MessageResponse, PageQuery,
    PaginatedResponse, UpdateUserDTO, UserDTO,
};
use crate::entities::User;
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn user_not_found() -> AppError {
    AppError::not_found("User not found")
}

/// `POST /api/users` - admins provision accounts ahead of their first login
#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<CreateUserDTO>,
) -> Result<(StatusCode, Json<DataResponse<UserDTO>>), AppError> {
    require_admin(&current_user)?;
    body.validate()?;

    let user = state.user.create(&body).await?;
    info!(created = %user.id, "User provisioned");
    Ok((StatusCode::CREATED, Json(DataResponse::new(UserDTO::from(user)))))
}

#[instrument(skip(state, page))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserDTO>>, AppError> {
    let page = page.resolve(DEFAULT_PAGE_SIZE);
    let (users, total) = state.user.list(&page).await?;
    debug!(total, "Listed users");

    Ok(Json(PaginatedResponse {
        data: users.into_iter().map(UserDTO::from).collect(),
        pagination: page.meta(total),
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DataResponse<UserDTO>>, AppError> {
    let user_id = parse_id(&user_id, "Invalid user ID")?;
    let user = state.user.read(&user_id).await?.ok_or_else(user_not_found)?;
    Ok(Json(DataResponse::new(UserDTO::from(user))))
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<DataResponse<UserDTO>>, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }
    let user = state
        .user
        .find_by_email(email)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(Json(DataResponse::new(UserDTO::from(user))))
}

/// `PUT /api/users/{id}` - own profile, or any profile for admins. Role and
/// activation are admin-only fields.
#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(user_id): Path<String>,
    AppJson(body): AppJson<UpdateUserDTO>,
) -> Result<Json<DataResponse<UserDTO>>, AppError> {
    let user_id = parse_id(&user_id, "Invalid user ID")?;
    require_self_or_admin(&current_user, &user_id)?;
    if body.touches_admin_fields() && !current_user.is_admin() {
        warn!("Non-admin tried to change role or activation");
        return Err(AppError::forbidden("Only admins can change role or activation"));
    }
    body.validate()?;

    let user = state.user.update(&user_id, &body).await.map_err(|e| match e {
        sqlx::Error::RowNotFound => user_not_found(),
        other => other.into(),
    })?;
    info!(target_user = %user_id, "User updated");
    Ok(Json(DataResponse::new(UserDTO::from(user))))
}

/// `DELETE /api/users/{id}` - removes the account with its events and RSVPs
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = parse_id(&user_id, "Invalid user ID")?;
    require_self_or_admin(&current_user, &user_id)?;

    state.user.delete(&user_id).await.map_err(|e| match e {
        sqlx::Error::RowNotFound => user_not_found(),
        other => other.into(),
    })?;
    info!(target_user = %user_id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// `GET /api/user/me` - the local account behind the bearer token
#[instrument(skip(current_user), fields(user_id = %current_user.id))]
pub async fn get_me(Extension(current_user): Extension<User>) -> Json<DataResponse<UserDTO>> {
    Json(DataResponse::new(UserDTO::from(current_user)))
}
