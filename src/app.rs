use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, Store};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, proxy_basic_auth_middleware};
use crate::services::{PasswordError, PasswordService};

/// Shared dependencies injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordService>,
    pub config: Arc<AppConfig>,
}

/// Start-up failures: bad secrets, bad hashing parameters, unreachable database.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("token configuration: {0}")]
    Token(#[from] TokenError),

    #[error("password hashing configuration: {0}")]
    Password(#[from] PasswordError),

    #[error("database: {0}")]
    Database(#[from] DatabaseError),
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, ConfigError> {
        let tokens = TokenService::from_config(&config.security)?;
        let passwords = PasswordService::new(&config.security.password_hash)?;

        Ok(Self {
            store,
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            config: Arc::new(config),
        })
    }

    /// Opens the configured store and builds the state around it.
    pub async fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let store = DatabaseManager::connect(&config.database).await?;
        Self::new(config, store)
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .merge(user_routes())
        .merge(application_routes())
        .merge(link_routes())
        .merge(department_routes())
        .merge(profile_routes())
        .merge(read_only_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let app = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/login", axum::routing::post(public::login))
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), proxy_basic_auth_middleware))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config))
        .with_state(state);

    if config.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn user_routes() -> Router<AppState> {
    use axum::routing::put;
    use protected::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create).delete(users::purge))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/api/users/pass/:id", put(users::change_password))
}

fn application_routes() -> Router<AppState> {
    use protected::applications;

    Router::new()
        .route(
            "/api/aplicacao",
            get(applications::list)
                .post(applications::create)
                .delete(applications::purge),
        )
        .route(
            "/api/aplicacao/:id",
            get(applications::get)
                .put(applications::update)
                .delete(applications::delete),
        )
}

fn link_routes() -> Router<AppState> {
    use protected::links;

    Router::new()
        .route("/api/link", get(links::list).post(links::create).delete(links::purge))
        .route(
            "/api/link/:id",
            get(links::get).put(links::update).delete(links::delete),
        )
}

fn department_routes() -> Router<AppState> {
    use protected::departments;

    Router::new()
        .route(
            "/api/departamento",
            get(departments::list)
                .post(departments::create)
                .delete(departments::purge),
        )
        .route(
            "/api/departamento/:id",
            get(departments::get)
                .put(departments::update)
                .delete(departments::delete),
        )
}

fn profile_routes() -> Router<AppState> {
    use protected::profiles;

    Router::new()
        .route(
            "/api/profiles",
            get(profiles::list).post(profiles::create).delete(profiles::purge),
        )
        .route(
            "/api/profiles/:id",
            get(profiles::get).put(profiles::update).delete(profiles::delete),
        )
}

fn read_only_routes() -> Router<AppState> {
    use protected::{general_departments, servers};

    Router::new()
        .route("/api/servidor", get(servers::list))
        .route("/api/servidor/:id", get(servers::get))
        .route("/api/deps", get(general_departments::list))
        .route("/api/deps/:id", get(general_departments::get))
}

/// Permissive when no origins are configured, otherwise an explicit allow-list.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}
