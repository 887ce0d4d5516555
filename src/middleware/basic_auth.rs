use axum::{
    extract::{Request, State},
    http::{header::PROXY_AUTHENTICATE, header::PROXY_AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;

use crate::app::AppState;
use crate::config::BasicAuthConfig;

const REALM: &str = r#"Basic realm="sirius", charset="UTF-8""#;

/// Proxy-tier gate. Active only when basic-auth credentials are configured; it
/// reads `Proxy-Authorization` so that `Authorization` stays free for the bearer token.
pub async fn proxy_basic_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.security.basic_auth.as_ref() else {
        return next.run(request).await;
    };

    if credentials_match(request.headers(), expected) {
        next.run(request).await
    } else {
        tracing::warn!("Rejected request to {} at the proxy tier", request.uri().path());
        challenge()
    }
}

fn credentials_match(headers: &HeaderMap, expected: &BasicAuthConfig) -> bool {
    decode_basic(headers)
        .map(|(username, password)| username == expected.username && password == expected.password)
        .unwrap_or(false)
}

/// `Proxy-Authorization: Basic base64(user:pass)` -> (user, pass)
fn decode_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(PROXY_AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn challenge() -> Response {
    let body = Json(json!({
        "success": false,
        "error": "Proxy authentication required",
        "code": "PROXY_AUTHENTICATION_REQUIRED"
    }));

    let mut response = (StatusCode::PROXY_AUTHENTICATION_REQUIRED, body).into_response();
    response
        .headers_mut()
        .insert(PROXY_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}
