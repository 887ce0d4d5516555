// handlers/protected/users.rs - /api/users
//
// Lists and reads are filtered by the requester's department unless they are
// an administrator; everyone can read their own account. Creating and deleting
// accounts is admin-only; updates and password changes are open to
// administrators and to the account owner.

use axum::{extract::State, Extension};
use serde::Deserialize;

use super::{double_option, Created, Deleted, Purged, RecordId, Updated, Validator};
use crate::app::AppState;
use crate::database::models::{NewUser, UserChanges, UserRecord};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::policy::{visible, Requester, Role};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    /// Defaults to the username.
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to the standard user profile.
    pub profile_id: Option<i32>,
    pub department_id: Option<i32>,
}

/// Omitted fields keep their current value; `"department_id": null` clears the department.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<i32>>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<UserRecord>> {
    let requester = Requester::from_auth(&auth)?;
    let users = state.store.list_users(requester.scope()).await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/users/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<UserRecord> {
    let requester = Requester::from_auth(&auth)?;
    let user = state.store.get_user(id).await?;

    if requester.id != id && !visible(user.department_id, &requester) {
        return Err(ApiError::not_found(format!("User {} not found", id)));
    }
    Ok(ApiResponse::success(user))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> ApiResult<Created> {
    Requester::from_auth(&auth)?.require_admin()?;

    Validator::new()
        .required("username", &payload.username)
        .not_blank("name", payload.name.as_deref())
        .required("email", &payload.email)
        .email("email", &payload.email)
        .required("password", &payload.password)
        .finish()?;

    let username = payload.username.trim().to_string();
    let password_hash = state.passwords.hash(payload.password).await?;

    let id = state
        .store
        .create_user(NewUser {
            name: payload
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| username.clone()),
            username,
            email: payload.email.trim().to_string(),
            password_hash,
            profile_id: payload.profile_id.unwrap_or(Role::USER_PROFILE_ID),
            department_id: payload.department_id,
        })
        .await?;

    tracing::info!("User {} created by '{}'", id, auth.username);
    Ok(ApiResponse::created(Created { id }))
}

/// PUT /api/users/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> ApiResult<UserRecord> {
    let requester = Requester::from_auth(&auth)?;
    requester.require_self_or_admin(id)?;

    let mut validator = Validator::new();
    validator
        .not_blank("username", payload.username.as_deref())
        .not_blank("name", payload.name.as_deref())
        .not_blank("email", payload.email.as_deref());
    if let Some(email) = payload.email.as_deref() {
        validator.email("email", email);
    }
    validator.finish()?;

    let current = state.store.get_user(id).await?;
    let changes = UserChanges {
        username: payload
            .username
            .map(|v| v.trim().to_string())
            .unwrap_or(current.username),
        name: payload.name.map(|v| v.trim().to_string()).unwrap_or(current.name),
        email: payload.email.map(|v| v.trim().to_string()).unwrap_or(current.email),
        profile_id: payload.profile_id.unwrap_or(current.profile_id),
        department_id: payload.department_id.unwrap_or(current.department_id),
    };

    if !requester.is_admin()
        && (changes.profile_id != current.profile_id || changes.department_id != current.department_id)
    {
        return Err(ApiError::forbidden(
            "Only administrators may change profile or department",
        ));
    }

    state.store.update_user(id, changes).await?;
    let updated = state.store.get_user(id).await?;
    Ok(ApiResponse::success(updated))
}

/// PUT /api/users/pass/:id
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<PasswordRequest>,
) -> ApiResult<Updated> {
    Requester::from_auth(&auth)?.require_self_or_admin(id)?;
    Validator::new().required("password", &payload.password).finish()?;

    let password_hash = state.passwords.hash(payload.password).await?;
    state.store.update_password(id, password_hash).await?;

    tracing::info!("Password for user {} changed by '{}'", id, auth.username);
    Ok(ApiResponse::success(Updated { id }))
}

/// DELETE /api/users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    Requester::from_auth(&auth)?.require_admin()?;
    state.store.delete_user(id).await?;

    tracing::info!("User {} deleted by '{}'", id, auth.username);
    Ok(ApiResponse::success(Deleted { id }))
}

/// DELETE /api/users
pub async fn purge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Purged> {
    Requester::from_auth(&auth)?.require_admin()?;
    let deleted = state.store.delete_all_users().await?;

    tracing::warn!("All users ({}) deleted by '{}'", deleted, auth.username);
    Ok(ApiResponse::success(Purged { deleted }))
}
