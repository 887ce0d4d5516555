use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Sirius API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Administrative portal for applications, servers, links, departments, users and profiles",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "POST /api/login (public - token acquisition)",
                "users": "/api/users[/:id], PUT /api/users/pass/:id (protected)",
                "applications": "/api/aplicacao[/:id] (protected)",
                "links": "/api/link[/:id] (protected)",
                "departments": "/api/departamento[/:id] (protected)",
                "profiles": "/api/profiles[/:id] (protected, writes admin only)",
                "servers": "/api/servidor[/:id] (protected, read-only)",
                "general_departments": "/api/deps[/:id] (protected, read-only)"
            }
        }
    }))
}

/// GET /health - store connectivity probe
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
