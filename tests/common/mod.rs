#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sirius_api::app::{router, AppState};
use sirius_api::config::{AppConfig, BootstrapAdmin};
use sirius_api::database::models::{Lookup, NewServer};
use sirius_api::database::{MemoryStore, Store};
use sirius_api::services::bootstrap;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Router wired to a fresh store with one administrator.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::for_tests()).await
    }

    /// Memory store by default. With `SIRIUS_TEST_DATABASE_URL` set, each app gets
    /// its own Postgres schema so suites can run in parallel.
    pub async fn with_config(mut config: AppConfig) -> Self {
        let state = match test_database_url() {
            Some(url) => {
                config.database.url = url;
                config.database.schema = Some(unique_schema());
                config.database.max_connections = 2;
                AppState::from_config(config).await.expect("postgres test state")
            }
            None => {
                let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
                AppState::new(config, store).expect("test state")
            }
        };

        let admin = BootstrapAdmin {
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            email: "admin@sirius.test".to_string(),
        };
        bootstrap::ensure_admin(state.store.as_ref(), &state.passwords, &admin)
            .await
            .expect("bootstrap admin");

        let router = router(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, headers, body }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.call(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn token_for(&self, username: &str, password: &str) -> String {
        let res = self.login(username, password).await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn department(&self, name: &str) -> i32 {
        self.state
            .store
            .create_lookup(Lookup::Department, name.to_string())
            .await
            .expect("create department")
    }

    pub async fn general_department(&self, name: &str) -> i32 {
        self.state
            .store
            .create_lookup(Lookup::GeneralDepartment, name.to_string())
            .await
            .expect("create general department")
    }

    pub async fn server(&self, name: &str, ip_address: &str) -> i32 {
        self.state
            .store
            .create_server(NewServer {
                name: name.to_string(),
                ip_address: ip_address.to_string(),
                operating_system: "Linux".to_string(),
            })
            .await
            .expect("create server")
    }

    /// Creates a standard user through the API and returns their id.
    pub async fn standard_user(&self, admin_token: &str, username: &str, department_id: Option<i32>) -> i32 {
        let res = self
            .post(
                "/api/users",
                admin_token,
                json!({
                    "username": username,
                    "email": format!("{}@sirius.test", username),
                    "password": format!("{}-password", username),
                    "department_id": department_id,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create user failed: {}", res.body);
        res.body["data"]["id"].as_i64().expect("id") as i32
    }

    pub async fn standard_token(&self, username: &str) -> String {
        self.token_for(username, &format!("{}-password", username)).await
    }
}

pub fn test_database_url() -> Option<String> {
    std::env::var("SIRIUS_TEST_DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

static SCHEMA_SEQ: AtomicUsize = AtomicUsize::new(0);

fn unique_schema() -> String {
    format!(
        "sirius_test_{}_{}_{}",
        std::process::id(),
        chrono::Utc::now().timestamp_micros(),
        SCHEMA_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|row| row["id"].as_i64())
        .collect()
}

pub fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|row| row["name"].as_str().map(str::to_string))
        .collect()
}

// Spawned binary, for smoke tests over real HTTP.

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sirius-api"));
        match test_database_url() {
            Some(url) => cmd.env("DATABASE_URL", url).env("DATABASE_SCHEMA", unique_schema()),
            None => cmd.env("DATABASE_URL", "memory://").env_remove("DATABASE_SCHEMA"),
        };
        cmd.env("HOST", "127.0.0.1")
            .env("SIRIUS_API_PORT", port.to_string())
            .env("JWT_SECRET", "smoke-test-secret-key-minimum-32-characters")
            .env("PASSWORD_HASH_MEMORY_KIB", "1024")
            .env("PASSWORD_HASH_ITERATIONS", "1")
            .env("PASSWORD_HASH_PARALLELISM", "1")
            .env("BOOTSTRAP_ADMIN_USERNAME", ADMIN_USERNAME)
            .env("BOOTSTRAP_ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env_remove("BASIC_AUTH_USER")
            .env_remove("BASIC_AUTH_PASS")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() <= deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}
