use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` or `memory://`. Empty means "compose from PG* variables".
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Postgres schema to create and use instead of `public`.
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub basic_auth: Option<BasicAuthConfig>,
    pub password_hash: PasswordHashConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials required at the proxy tier when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("SIRIUS_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        match env::var("DATABASE_URL") {
            Ok(v) if !v.trim().is_empty() => self.database.url = v,
            _ => {
                if let Some(url) = compose_pg_url() {
                    self.database.url = url;
                }
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_SCHEMA") {
            self.database.schema = Some(v).filter(|s| !s.trim().is_empty());
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let (Ok(username), Ok(password)) = (env::var("BASIC_AUTH_USER"), env::var("BASIC_AUTH_PASS")) {
            if !username.is_empty() {
                self.security.basic_auth = Some(BasicAuthConfig { username, password });
            }
        }
        if let Ok(v) = env::var("PASSWORD_HASH_MEMORY_KIB") {
            self.security.password_hash.memory_kib = v.parse().unwrap_or(self.security.password_hash.memory_kib);
        }
        if let Ok(v) = env::var("PASSWORD_HASH_ITERATIONS") {
            self.security.password_hash.iterations = v.parse().unwrap_or(self.security.password_hash.iterations);
        }
        if let Ok(v) = env::var("PASSWORD_HASH_PARALLELISM") {
            self.security.password_hash.parallelism = v.parse().unwrap_or(self.security.password_hash.parallelism);
        }
        if let (Ok(username), Ok(password)) = (
            env::var("BOOTSTRAP_ADMIN_USERNAME"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            if !username.is_empty() && !password.is_empty() {
                let email = env::var("BOOTSTRAP_ADMIN_EMAIL")
                    .unwrap_or_else(|_| format!("{}@localhost", username));
                self.security.bootstrap_admin = Some(BootstrapAdmin { username, password, email });
            }
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                schema: None,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 1,
                cors_origins: Vec::new(),
                basic_auth: None,
                password_hash: PasswordHashConfig::default(),
                bootstrap_admin: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
                schema: None,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 1,
                cors_origins: vec!["https://staging.example.com".to_string()],
                basic_auth: None,
                password_hash: PasswordHashConfig::default(),
                bootstrap_admin: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                schema: None,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 1,
                cors_origins: vec!["https://app.example.com".to_string()],
                basic_auth: None,
                password_hash: PasswordHashConfig::default(),
                bootstrap_admin: None,
            },
        }
    }

    /// Configuration for in-process tests: memory store, fixed secret, cheap hashing.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.database.url = "memory://".to_string();
        config.security.jwt_secret = "test-secret-key-minimum-32-characters-long".to_string();
        config.security.password_hash = PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Builds a postgres URL from the libpq-style PGHOST/PGPORT/PGDATABASE/PGUSER/PGPASSWORD variables.
fn compose_pg_url() -> Option<String> {
    let host = env::var("PGHOST").ok()?;
    let mut url = url::Url::parse(&format!("postgres://{}", host)).ok()?;

    if let Ok(port) = env::var("PGPORT") {
        url.set_port(port.parse().ok()).ok()?;
    }
    if let Ok(user) = env::var("PGUSER") {
        url.set_username(&user).ok()?;
    }
    if let Ok(password) = env::var("PGPASSWORD") {
        url.set_password(Some(&password)).ok()?;
    }
    let database = env::var("PGDATABASE").unwrap_or_else(|_| "sirius".to_string());
    url.set_path(&format!("/{}", database));

    Some(url.into())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.security.jwt_expiry_hours, 1);
        assert!(config.security.basic_auth.is_none());
        assert!(config.security.cors_origins.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.jwt_expiry_hours, 1);
    }

    #[test]
    fn test_config_uses_memory_store_and_cheap_hashing() {
        let config = AppConfig::for_tests();
        assert_eq!(config.database.url, "memory://");
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.security.password_hash.iterations, 1);
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = AppConfig::for_tests();
        config.security.basic_auth = Some(BasicAuthConfig {
            username: "proxy".to_string(),
            password: "hunter2".to_string(),
        });
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("test-secret-key"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("proxy"));
    }
}
