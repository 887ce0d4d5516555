use serde::Serialize;
use tracing::{info, warn};

use crate::auth::TokenService;
use crate::database::Store;
use crate::error::ApiError;
use crate::services::password::PasswordService;

/// Public view of the authenticated user returned alongside the token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: i32,
    pub department: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
    pub expires_in: i64,
}

const BAD_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
    passwords: &'a PasswordService,
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a dyn Store, tokens: &'a TokenService, passwords: &'a PasswordService) -> Self {
        Self { store, tokens, passwords }
    }

    /// Unknown users and wrong passwords fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let Some(credentials) = self.store.find_credentials(username).await? else {
            warn!("Login attempt for unknown user '{}'", username);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        };

        let matches = self
            .passwords
            .verify(password.to_string(), credentials.password_hash.clone())
            .await?;
        if !matches {
            warn!("Wrong password for user '{}'", username);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        let issued = self.tokens.issue(&credentials)?;
        info!("User '{}' logged in", credentials.username);

        Ok(LoginResponse {
            user: LoginUser {
                id: credentials.id,
                username: credentials.username,
                name: credentials.name,
                email: credentials.email,
                role: credentials.profile_id,
                department: credentials.department_id,
            },
            token: issued.token,
            expires_in: issued.expires_in,
        })
    }
}
