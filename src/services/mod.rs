pub mod auth_service;
pub mod bootstrap;
pub mod password;

pub use auth_service::{AuthService, LoginResponse, LoginUser};
pub use password::{PasswordError, PasswordService};
