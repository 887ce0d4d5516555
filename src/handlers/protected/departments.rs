// handlers/protected/departments.rs - /api/departamento

use axum::{extract::State, Extension};

use super::lookup::{self, NameRequest};
use super::{Created, Deleted, Purged, RecordId};
use crate::app::AppState;
use crate::database::models::{Lookup, LookupRecord};
use crate::middleware::{ApiResult, AuthUser, JsonBody};
use crate::policy::Requester;

/// GET /api/departamento
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<LookupRecord>> {
    lookup::list(&state, Lookup::Department).await
}

/// GET /api/departamento/:id
pub async fn get(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<LookupRecord> {
    lookup::get(&state, Lookup::Department, id).await
}

/// POST /api/departamento
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NameRequest>,
) -> ApiResult<Created> {
    lookup::create(&state, Lookup::Department, payload).await
}

/// PUT /api/departamento/:id
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<NameRequest>,
) -> ApiResult<LookupRecord> {
    lookup::update(&state, Lookup::Department, id, payload).await
}

/// DELETE /api/departamento/:id
pub async fn delete(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<Deleted> {
    lookup::delete(&state, Lookup::Department, id).await
}

/// DELETE /api/departamento
pub async fn purge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Purged> {
    Requester::from_auth(&auth)?.require_admin()?;
    lookup::purge(&state, Lookup::Department).await
}
