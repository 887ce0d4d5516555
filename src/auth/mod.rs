use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::Credentials;

/// Token payload. `role` is the user's profile id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: i32,
    pub department: Option<i32>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &Credentials, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.profile_id,
            department: user.department_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token generation failed: {0}")]
    Generation(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("token lifetime of {0} hours is outside 1..={}", TokenService::MAX_TTL_HOURS)]
    InvalidLifetime(u64),
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Signs and verifies HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// One leap year.
    pub const MAX_TTL_HOURS: u64 = 24 * 366;

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        let hours = security.jwt_expiry_hours;
        if !(1..=Self::MAX_TTL_HOURS).contains(&hours) {
            return Err(TokenError::InvalidLifetime(hours));
        }
        let hours = i64::try_from(hours).map_err(|_| TokenError::InvalidLifetime(hours))?;
        Self::new(&security.jwt_secret, Duration::hours(hours))
    }

    pub fn issue(&self, user: &Credentials) -> Result<IssuedToken, TokenError> {
        let token = self.encode(&Claims::for_user(user, self.ttl))?;
        Ok(IssuedToken {
            token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Checks signature and expiry. There is no clock leeway: a past `exp` is always rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
