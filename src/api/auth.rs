use axum::{
    Extension, Form, Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::domain::Principal;
use crate::services::{NewUser, TokenGrant};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of both credential exchange endpoints: form-encoded on `/token`,
/// JSON on `/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` to the caller's [`Principal`] and
/// stores it in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or_else(ApiError::unauthorized)?;

    let principal = state.auth_service().resolve_token(token).await?;
    tracing::Span::current().record("user_id", principal.id);

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /token
/// OAuth2 password flow (form-encoded)
pub async fn token(
    State(state): State<Arc<AppState>>,
    WithRejection(Form(payload), _): WithRejection<Form<LoginRequest>, ApiError>,
) -> Result<Json<TokenGrant>, ApiError> {
    let grant = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(grant))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<TokenGrant>, ApiError> {
    let grant = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;
    tracing::info!(username = %payload.username, "User logged in");
    Ok(Json(grant))
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUser>, ApiError>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service().register(payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service().get(&principal, principal.id).await?;
    Ok(Json(ApiResponse::success(user)))
}
