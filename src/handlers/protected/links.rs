// handlers/protected/links.rs - /api/link

use axum::{extract::State, Extension};
use serde::Deserialize;

use super::{Created, Deleted, Purged, RecordId, Validator};
use crate::app::AppState;
use crate::database::models::{LinkRecord, NewLink};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::policy::Requester;

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub general_department_ids: Vec<i32>,
}

impl LinkRequest {
    fn validate(self) -> Result<NewLink, ApiError> {
        Validator::new()
            .required("name", &self.name)
            .required("url", &self.url)
            .finish()?;

        Ok(NewLink {
            name: self.name.trim().to_string(),
            service: self.service.trim().to_string(),
            url: self.url.trim().to_string(),
            general_department_ids: self.general_department_ids,
        })
    }
}

/// GET /api/link
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<LinkRecord>> {
    Ok(ApiResponse::success(state.store.list_links().await?))
}

/// GET /api/link/:id
pub async fn get(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<LinkRecord> {
    Ok(ApiResponse::success(state.store.get_link(id).await?))
}

/// POST /api/link
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<LinkRequest>,
) -> ApiResult<Created> {
    let id = state.store.create_link(payload.validate()?).await?;
    tracing::info!("Link {} created by '{}'", id, auth.username);
    Ok(ApiResponse::created(Created { id }))
}

/// PUT /api/link/:id
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<LinkRequest>,
) -> ApiResult<LinkRecord> {
    state.store.update_link(id, payload.validate()?).await?;
    Ok(ApiResponse::success(state.store.get_link(id).await?))
}

/// DELETE /api/link/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_link(id).await?;
    tracing::info!("Link {} deleted by '{}'", id, auth.username);
    Ok(ApiResponse::success(Deleted { id }))
}

/// DELETE /api/link
pub async fn purge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Purged> {
    Requester::from_auth(&auth)?.require_admin()?;
    let deleted = state.store.delete_all_links().await?;

    tracing::warn!("All links ({}) deleted by '{}'", deleted, auth.username);
    Ok(ApiResponse::success(Purged { deleted }))
}
