//! User directory endpoints.
//!
//! Handlers only translate between HTTP and [`UserService`]; every access
//! rule lives in the service.
//!
//! [`UserService`]: crate::services::UserService

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use super::validation::{validate_id, validate_limit};
use super::{ApiError, ApiResponse, AppState, MessageResponse, Pagination};
use crate::db::User;
use crate::domain::Principal;
use crate::services::{NewUser, PasswordChange, UserUpdate, UserWithStats};

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, ApiError>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let limit = validate_limit(page.limit)?;
    let users = state
        .user_service()
        .list(&principal, page.skip, limit)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUser>, ApiError>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service().create(&principal, payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_id("user", id)?;
    let user = state.user_service().get(&principal, id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /users/{id}/stats
pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserWithStats>>, ApiError> {
    let id = validate_id("user", id)?;
    let stats = state.user_service().get_with_stats(&principal, id).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    WithRejection(Json(payload), _): WithRejection<Json<UserUpdate>, ApiError>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_id("user", id)?;
    let user = state
        .user_service()
        .update(&principal, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /users/{id}/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    WithRejection(Json(payload), _): WithRejection<Json<PasswordChange>, ApiError>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("user", id)?;
    state
        .user_service()
        .change_password(&principal, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("user", id)?;
    state.user_service().delete(&principal, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "User {id} deleted"
    )))))
}
