use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const BACKEND_URL_ENV: &str = "DCA_BACKEND_URL";
const FRONTEND_URL_ENV: &str = "DCA_FRONTEND_URL";
const API_TIMEOUT_ENV: &str = "DCA_API_TIMEOUT_SECS";
const ARCHIVE_DIR_ENV: &str = "DCA_ARCHIVE_DIR";

const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_API_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ARCHIVE_DIR: &str = "test-results";

/// Runtime settings, sourced from the environment with the defaults the
/// original tooling shipped with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: String,
    pub frontend_url: String,
    pub api_timeout: Duration,
    pub archive_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let backend_url = env_url(BACKEND_URL_ENV, DEFAULT_BACKEND_URL)?;
        let frontend_url = env_url(FRONTEND_URL_ENV, DEFAULT_FRONTEND_URL)?;
        let timeout_secs = env_u64_at_least(API_TIMEOUT_ENV, DEFAULT_API_TIMEOUT_SECS, 1)?;
        let archive_dir = PathBuf::from(env_string(ARCHIVE_DIR_ENV, DEFAULT_ARCHIVE_DIR));

        Ok(Self {
            backend_url,
            frontend_url,
            api_timeout: Duration::from_secs(timeout_secs),
            archive_dir,
        })
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_url(key: &str, default: &str) -> Result<String> {
    let raw = env_string(key, default);
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err(anyhow!(
            "{} must be an http(s) URL (value: {})",
            key,
            raw
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn env_u64_at_least(key: &str, default: u64, min: u64) -> Result<u64> {
    let Some(raw) = env::var(key).ok().filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow!("{} must be an integer (value: {})", key, raw))?;
    if value < min {
        return Err(anyhow!("{} must be >= {} (value: {})", key, min, raw));
    }
    Ok(value)
}
