pub mod auth;
pub mod basic_auth;
pub mod json;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use basic_auth::proxy_basic_auth_middleware;
pub use json::JsonBody;
pub use response::{ApiResponse, ApiResult};
