use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Target API, stored in server.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Logged-in session, stored in session.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub user_id: i32,
    pub role: i32,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl ServerInfo {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            url: normalize_url(url)?,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        })
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

impl Session {
    pub fn new(username: String, user_id: i32, role: i32, token: String, expires_in: i64) -> Self {
        Self {
            username,
            user_id,
            role,
            token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Accepts `host:port` or a full URL; always stores `scheme://host[:port]` without a trailing slash.
pub fn normalize_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = url::Url::parse(&with_scheme)
        .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Unsupported scheme '{}' (expected http or https)", url.scheme());
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// The CLI's on-disk state: `server.json` and `session.json` in one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// `$SIRIUS_CLI_CONFIG_DIR`, else `~/.config/sirius/cli`
    pub fn open() -> anyhow::Result<Self> {
        let dir = if let Ok(custom_dir) = std::env::var("SIRIUS_CLI_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("sirius").join("cli")
        };
        Self::at(dir)
    }

    pub fn at(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_server(&self) -> anyhow::Result<Option<ServerInfo>> {
        self.load("server.json")
    }

    pub fn save_server(&self, server: &ServerInfo) -> anyhow::Result<()> {
        self.save("server.json", server)
    }

    pub fn load_session(&self) -> anyhow::Result<Option<Session>> {
        self.load("session.json")
    }

    pub fn save_session(&self, session: &Session) -> anyhow::Result<()> {
        self.save("session.json", session)
    }

    /// Removes the session file. Returns whether there was one.
    pub fn clear_session(&self) -> anyhow::Result<bool> {
        let path = self.dir.join("session.json");
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn load<T: serde::de::DeserializeOwned>(&self, file: &str) -> anyhow::Result<Option<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Corrupt {}: {}", path.display(), e))?;
        Ok(Some(value))
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.dir.join(file), content)?;
        Ok(())
    }
}

pub async fn ping_server(server: &ServerInfo) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = format!("{}/health", server.url);

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}
