// handlers/protected/applications.rs - /api/aplicacao
//
// Applications belong to a department and run on zero or more servers. Rows
// outside the requester's department are invisible to non-administrators,
// including for update and delete.

use axum::{extract::State, Extension};
use serde::Deserialize;

use super::{Created, Deleted, Purged, RecordId, Validator};
use crate::app::AppState;
use crate::database::models::{ApplicationRecord, NewApplication};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::policy::{visible, Requester};

/// Create and update share one shape; update replaces the server set wholesale.
#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub department_id: Option<i32>,
    #[serde(default)]
    pub server_ids: Vec<i32>,
}

impl ApplicationRequest {
    fn validate(self) -> Result<NewApplication, ApiError> {
        Validator::new()
            .required("name", &self.name)
            .present("department_id", &self.department_id)
            .finish()?;

        let department_id = self
            .department_id
            .ok_or_else(|| ApiError::invalid_field("department_id", "department_id is required"))?;

        Ok(NewApplication {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            department_id,
            server_ids: self.server_ids,
        })
    }
}

/// Loads an application and hides it from requesters outside its department.
async fn visible_application(
    state: &AppState,
    requester: &Requester,
    id: i32,
) -> Result<ApplicationRecord, ApiError> {
    let application = state.store.get_application(id).await?;
    if visible(Some(application.department_id), requester) {
        Ok(application)
    } else {
        Err(ApiError::not_found(format!("Application {} not found", id)))
    }
}

/// Non-administrators may only place applications in their own department.
fn require_assignable(department_id: i32, requester: &Requester) -> Result<(), ApiError> {
    if visible(Some(department_id), requester) {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Applications can only be assigned to your own department",
        ))
    }
}

/// GET /api/aplicacao
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<ApplicationRecord>> {
    let requester = Requester::from_auth(&auth)?;
    let applications = state.store.list_applications(requester.scope()).await?;
    Ok(ApiResponse::success(applications))
}

/// GET /api/aplicacao/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<ApplicationRecord> {
    let requester = Requester::from_auth(&auth)?;
    let application = visible_application(&state, &requester, id).await?;
    Ok(ApiResponse::success(application))
}

/// POST /api/aplicacao
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<ApplicationRequest>,
) -> ApiResult<Created> {
    let requester = Requester::from_auth(&auth)?;
    let application = payload.validate()?;
    require_assignable(application.department_id, &requester)?;

    let id = state.store.create_application(application).await?;
    tracing::info!("Application {} created by '{}'", id, auth.username);
    Ok(ApiResponse::created(Created { id }))
}

/// PUT /api/aplicacao/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<ApplicationRequest>,
) -> ApiResult<ApplicationRecord> {
    let requester = Requester::from_auth(&auth)?;
    let changes = payload.validate()?;
    visible_application(&state, &requester, id).await?;
    require_assignable(changes.department_id, &requester)?;

    state.store.update_application(id, changes).await?;
    let updated = state.store.get_application(id).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/aplicacao/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    let requester = Requester::from_auth(&auth)?;
    visible_application(&state, &requester, id).await?;

    state.store.delete_application(id).await?;
    tracing::info!("Application {} deleted by '{}'", id, auth.username);
    Ok(ApiResponse::success(Deleted { id }))
}

/// DELETE /api/aplicacao
pub async fn purge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Purged> {
    Requester::from_auth(&auth)?.require_admin()?;
    let deleted = state.store.delete_all_applications().await?;

    tracing::warn!("All applications ({}) deleted by '{}'", deleted, auth.username);
    Ok(ApiResponse::success(Purged { deleted }))
}
