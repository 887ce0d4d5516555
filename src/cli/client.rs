use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::config::{ConfigStore, Session};

/// Thin HTTP client for the Sirius API that unwraps the `{success, data}` envelope.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
    config: ConfigStore,
}

/// Error body returned by the API, rendered for the terminal.
#[derive(Debug, thiserror::Error)]
#[error("{message} ({code})")]
pub struct ApiFailure {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub field_errors: Vec<(String, String)>,
}

impl ApiFailure {
    fn from_body(status: StatusCode, body: &Value) -> Self {
        let field_errors = body
            .get("field_errors")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(field, message)| (field.clone(), message.as_str().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            status: status.as_u16(),
            code: body
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("HTTP_ERROR")
                .to_string(),
            message: body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", status)),
            field_errors,
        }
    }
}

impl ApiClient {
    /// Client for the configured server, without credentials.
    pub fn anonymous(config: &ConfigStore) -> anyhow::Result<Self> {
        let server = config
            .load_server()?
            .ok_or_else(|| anyhow::anyhow!("No server configured; run `sirius server set <url>`"))?;

        Ok(Self {
            base_url: server.url,
            http: reqwest::Client::new(),
            token: None,
            config: config.clone(),
        })
    }

    /// Client carrying the saved session token. Missing or expired sessions send the
    /// operator back to `sirius auth login`.
    pub fn authenticated(config: &ConfigStore) -> anyhow::Result<Self> {
        let mut client = Self::anonymous(config)?;
        let session = require_session(config)?;
        client.token = Some(session.token);
        Ok(client)
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Cannot reach {}: {}", self.base_url, e))?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status == StatusCode::UNAUTHORIZED && self.token.is_some() {
            self.config.clear_session()?;
            anyhow::bail!("Session rejected by server; run `sirius auth login <username>`");
        }

        if !status.is_success() || body.get("success") == Some(&Value::Bool(false)) {
            return Err(ApiFailure::from_body(status, &body).into());
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// Loads the session, discarding it when expired.
pub fn require_session(config: &ConfigStore) -> anyhow::Result<Session> {
    match config.load_session()? {
        Some(session) if !session.is_expired() => Ok(session),
        Some(_) => {
            config.clear_session()?;
            anyhow::bail!("Session expired; run `sirius auth login <username>`")
        }
        None => anyhow::bail!("Not logged in; run `sirius auth login <username>`"),
    }
}
