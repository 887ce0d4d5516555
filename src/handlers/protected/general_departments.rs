// handlers/protected/general_departments.rs - /api/deps (read-only)

use axum::extract::State;

use super::lookup;
use super::RecordId;
use crate::app::AppState;
use crate::database::models::{Lookup, LookupRecord};
use crate::middleware::ApiResult;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<LookupRecord>> {
    lookup::list(&state, Lookup::GeneralDepartment).await
}

pub async fn get(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<LookupRecord> {
    lookup::get(&state, Lookup::GeneralDepartment, id).await
}
