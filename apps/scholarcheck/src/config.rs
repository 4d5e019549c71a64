use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CALLBACK_PORT: u16 = 5173;
const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;

/// Client configuration loaded from environment variables.
/// Every value has a default; only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub request_timeout: Duration,
    pub callback_port: u16,
    pub login_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: optional_env("SCHOLARCHECK_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            state_dir: optional_env("SCHOLARCHECK_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_state_dir),
            request_timeout: Duration::from_secs(parse_env(
                "SCHOLARCHECK_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            callback_port: parse_env("SCHOLARCHECK_CALLBACK_PORT", DEFAULT_CALLBACK_PORT)?,
            login_timeout: Duration::from_secs(parse_env(
                "SCHOLARCHECK_LOGIN_TIMEOUT_SECS",
                DEFAULT_LOGIN_TIMEOUT_SECS,
            )?),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, state_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = state_dir {
            self.state_dir = dir;
        }
        self
    }

    pub fn storage_path(&self) -> PathBuf {
        self.state_dir.join("storage.json")
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scholarcheck")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: PathBuf::from("/tmp/scholarcheck"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            callback_port: DEFAULT_CALLBACK_PORT,
            login_timeout: Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS),
            rust_log: "warn".to_string(),
        }
    }

    #[test]
    fn test_overrides_trim_trailing_slash() {
        let config = base().with_overrides(Some("https://api.example.com/".to_string()), None);
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/scholarcheck"));
    }

    #[test]
    fn test_storage_path_is_inside_state_dir() {
        let config = base().with_overrides(None, Some(PathBuf::from("/var/lib/sc")));
        assert_eq!(config.storage_path(), PathBuf::from("/var/lib/sc/storage.json"));
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("SCHOLARCHECK_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }
}
