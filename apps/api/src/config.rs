use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::ReadPolicy;
use crate::uploads::storage::UploadBackend;

/// Multer-compatible default: 5 MiB per uploaded photo.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory holding users.json, jobs.json, candidates.json and job_config.json.
    pub data_dir: PathBuf,
    pub read_policy: ReadPolicy,
    pub upload_storage: UploadBackend,
    /// Only used by the disk upload backend.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_enabled: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            data_dir: env_or("DATA_DIR", "data").into(),
            read_policy: env_or("DATA_READ_POLICY", "fail_open")
                .parse()
                .context("DATA_READ_POLICY must be 'fail_open' or 'strict'")?,
            upload_storage: env_or("UPLOAD_STORAGE", "memory")
                .parse()
                .context("UPLOAD_STORAGE must be 'memory' or 'disk'")?,
            upload_dir: env_or("UPLOAD_DIR", "uploads").into(),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            cors_enabled: env_or("CORS_ENABLED", "true")
                .parse::<bool>()
                .context("CORS_ENABLED must be 'true' or 'false'")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
