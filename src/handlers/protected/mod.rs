// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Everything under /api except /api/login. The JWT middleware has already
// placed an `AuthUser` in the request extensions; handlers turn it into a
// `policy::Requester` when they need a role.

pub mod applications;
pub mod departments;
pub mod general_departments;
pub mod links;
pub mod lookup;
pub mod profiles;
pub mod servers;
pub mod users;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::Serialize;

use crate::error::{ApiError, FieldErrors};

/// `:id` path segment as a positive integer. Anything else is a validation error.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub i32);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid_field("id", "Missing record id"))?;

        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Ok(RecordId(id)),
            _ => Err(ApiError::invalid_field("id", format!("'{}' is not a valid id", raw))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct Purged {
    pub deleted: u64,
}

/// Collects field-level messages and fails once with all of them.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("{} is required", field));
        }
        self
    }

    /// `Some("")` is rejected; `None` means "not supplied" and passes.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.required(field, value);
        }
        self
    }

    pub fn present<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.fail(field, format!("{} is required", field));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() && !looks_like_email(value) {
            self.fail(field, format!("{} must be a valid email address", field));
        }
        self
    }

    fn fail(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_insert(message);
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(
                "Invalid request fields",
                Some(std::mem::take(&mut self.errors)),
            ))
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    }
}

/// Deserialize helper that keeps "absent" (`None`) apart from "null" (`Some(None)`).
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failing_field() {
        let err = Validator::new()
            .required("username", " ")
            .required("name", "ok")
            .email("email", "not-an-email")
            .present::<i32>("department_id", &None)
            .finish()
            .unwrap_err();

        let body = err.to_json();
        assert_eq!(body["field_errors"]["username"], "username is required");
        assert_eq!(body["field_errors"]["email"], "email must be a valid email address");
        assert_eq!(body["field_errors"]["department_id"], "department_id is required");
        assert!(body["field_errors"].get("name").is_none());
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("jdoe@x.com"));
        assert!(!looks_like_email("jdoe@"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("j doe@x.com"));
        assert!(!looks_like_email("a@b@c"));
    }

    #[test]
    fn absent_optional_fields_pass() {
        assert!(Validator::new().not_blank("name", None).finish().is_ok());
        assert!(Validator::new().not_blank("name", Some("")).finish().is_err());
    }
}
