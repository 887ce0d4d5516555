use clap::Subcommand;
use serde_json::json;

use crate::cli::client::{require_session, ApiClient};
use crate::cli::config::{ConfigStore, Session};
use crate::cli::utils::{output_record, output_success, read_password};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = ConfigStore::open()?;

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = read_password(password)?;
            let data = ApiClient::anonymous(&config)?
                .post("/api/login", json!({ "username": username, "password": password }))
                .await?;

            let session = session_from_login(&data)?;
            config.save_session(&session)?;
            output_success(
                &output_format,
                &format!("Logged in as {}", session.username),
                Some(json!({ "username": session.username, "expires_at": session.expires_at })),
            )
        }
        AuthCommands::Logout => {
            let had_session = config.clear_session()?;
            let message = if had_session { "Logged out" } else { "No active session" };
            output_success(&output_format, message, None)
        }
        AuthCommands::Status => {
            let session = require_session(&config)?;
            output_record(
                &output_format,
                &json!({
                    "username": session.username,
                    "user_id": session.user_id,
                    "role": session.role,
                    "expires_at": session.expires_at,
                }),
            )
        }
    }
}

/// `{ user: {id, username, role}, token, expires_in }` -> Session
fn session_from_login(data: &serde_json::Value) -> anyhow::Result<Session> {
    let malformed = || anyhow::anyhow!("Malformed login response");
    let user = data.get("user").ok_or_else(malformed)?;

    Ok(Session::new(
        user.get("username").and_then(|v| v.as_str()).ok_or_else(malformed)?.to_string(),
        user.get("id").and_then(|v| v.as_i64()).ok_or_else(malformed)? as i32,
        user.get("role").and_then(|v| v.as_i64()).ok_or_else(malformed)? as i32,
        data.get("token").and_then(|v| v.as_str()).ok_or_else(malformed)?.to_string(),
        data.get("expires_in").and_then(|v| v.as_i64()).ok_or_else(malformed)?,
    ))
}
