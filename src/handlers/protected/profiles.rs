// handlers/protected/profiles.rs - /api/profiles
//
// Profiles decide authorization tier, so every write is admin-only.

use axum::{extract::State, Extension};

use super::lookup::{self, NameRequest};
use super::{Created, Deleted, Purged, RecordId};
use crate::app::AppState;
use crate::database::models::{Lookup, LookupRecord};
use crate::middleware::{ApiResult, AuthUser, JsonBody};
use crate::policy::Requester;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<LookupRecord>> {
    lookup::list(&state, Lookup::Profile).await
}

pub async fn get(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<LookupRecord> {
    lookup::get(&state, Lookup::Profile, id).await
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<NameRequest>,
) -> ApiResult<Created> {
    Requester::from_auth(&auth)?.require_admin()?;
    lookup::create(&state, Lookup::Profile, payload).await
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<NameRequest>,
) -> ApiResult<LookupRecord> {
    Requester::from_auth(&auth)?.require_admin()?;
    lookup::update(&state, Lookup::Profile, id, payload).await
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    Requester::from_auth(&auth)?.require_admin()?;
    lookup::delete(&state, Lookup::Profile, id).await
}

pub async fn purge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Purged> {
    Requester::from_auth(&auth)?.require_admin()?;
    lookup::purge(&state, Lookup::Profile).await
}
