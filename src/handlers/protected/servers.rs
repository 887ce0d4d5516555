// handlers/protected/servers.rs - /api/servidor (read-only)

use axum::extract::State;

use super::RecordId;
use crate::app::AppState;
use crate::database::models::ServerRecord;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ServerRecord>> {
    Ok(ApiResponse::success(state.store.list_servers().await?))
}

pub async fn get(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<ServerRecord> {
    Ok(ApiResponse::success(state.store.get_server(id).await?))
}
