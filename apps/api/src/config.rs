use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::Deserialize;

/// Application configuration loaded from environment variables, plus the
/// admin credentials file it points at.
/// Fails at startup if a value is malformed or the credentials file is unreadable.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_file: PathBuf,
    pub public_dir: PathBuf,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
    pub admin: AdminCredentials,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let admin_config = PathBuf::from(env_or("ADMIN_CONFIG", "config.json"));

        Ok(Config {
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            data_file: PathBuf::from(env_or("DATA_FILE", "data/applications.json")),
            public_dir: PathBuf::from(env_or("PUBLIC_DIR", "public")),
            session_ttl: parse_session_ttl(&env_or("SESSION_TTL_SECS", "86400"))
                .context("SESSION_TTL_SECS must be a positive whole number of seconds")?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", "10485760")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            admin: AdminCredentials::from_file(&admin_config)?,
        })
    }

    /// Directory resumes are written to. Served publicly under `/uploads`.
    pub fn upload_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }
}

/// Admin username/password pair, compared as plain strings.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredentials {
    pub admin_username: String,
    pub admin_password: String,
}

impl AdminCredentials {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read admin config '{}'", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Admin config '{}' is malformed", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        username == self.admin_username && password == self.admin_password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .finish()
    }
}

/// Session lifetime in seconds; must be positive and representable.
fn parse_session_ttl(raw: &str) -> Result<Duration> {
    let secs = raw.trim().parse::<i64>()?;
    if secs <= 0 {
        return Err(anyhow!("{secs} is not a positive duration"));
    }
    Duration::try_seconds(secs).ok_or_else(|| anyhow!("{secs} seconds is out of range"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
