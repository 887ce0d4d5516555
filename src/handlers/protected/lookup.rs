// Shared CRUD for the name-only tables (profiles, departments, general departments).

use serde::Deserialize;

use super::{Created, Deleted, Purged, Validator};
use crate::app::AppState;
use crate::database::models::{Lookup, LookupRecord};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    #[serde(default)]
    pub name: String,
}

impl NameRequest {
    fn validate(self) -> Result<String, ApiError> {
        Validator::new().required("name", &self.name).finish()?;
        Ok(self.name.trim().to_string())
    }
}

pub async fn list(state: &AppState, kind: Lookup) -> ApiResult<Vec<LookupRecord>> {
    Ok(ApiResponse::success(state.store.list_lookup(kind).await?))
}

pub async fn get(state: &AppState, kind: Lookup, id: i32) -> ApiResult<LookupRecord> {
    Ok(ApiResponse::success(state.store.get_lookup(kind, id).await?))
}

pub async fn create(state: &AppState, kind: Lookup, payload: NameRequest) -> ApiResult<Created> {
    let name = payload.validate()?;
    let id = state.store.create_lookup(kind, name).await?;
    tracing::info!("{} {} created", kind.label(), id);
    Ok(ApiResponse::created(Created { id }))
}

pub async fn update(state: &AppState, kind: Lookup, id: i32, payload: NameRequest) -> ApiResult<LookupRecord> {
    let name = payload.validate()?;
    state.store.update_lookup(kind, id, name).await?;
    Ok(ApiResponse::success(state.store.get_lookup(kind, id).await?))
}

pub async fn delete(state: &AppState, kind: Lookup, id: i32) -> ApiResult<Deleted> {
    state.store.delete_lookup(kind, id).await?;
    tracing::info!("{} {} deleted", kind.label(), id);
    Ok(ApiResponse::success(Deleted { id }))
}

pub async fn purge(state: &AppState, kind: Lookup) -> ApiResult<Purged> {
    let deleted = state.store.delete_all_lookup(kind).await?;
    tracing::warn!("All {} rows ({}) deleted", kind.table(), deleted);
    Ok(ApiResponse::success(Purged { deleted }))
}
