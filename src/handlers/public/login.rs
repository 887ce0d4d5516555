// handlers/public/login.rs - POST /api/login

use axum::extract::State;
use serde::Deserialize;

use crate::app::AppState;
use crate::handlers::protected::Validator;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::{AuthService, LoginResponse};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/**
 * POST /api/login - exchange credentials for a bearer token
 *
 * Input:  { "username": "jdoe", "password": "secret" }
 * Output: { "success": true, "data": { "user": {...}, "token": "eyJ...", "expires_in": 3600 } }
 *
 * Unknown user and wrong password are indistinguishable (401 UNAUTHORIZED).
 */
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Validator::new()
        .required("username", &payload.username)
        .required("password", &payload.password)
        .finish()?;

    let response = AuthService::new(state.store.as_ref(), &state.tokens, &state.passwords)
        .login(payload.username.trim(), &payload.password)
        .await?;

    Ok(ApiResponse::success(response))
}
