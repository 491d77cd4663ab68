use std::path::PathBuf;
use std::time::Duration;

use perfman_store::StoreOptions;

/// Default data directory below `$HOME`.
const DEFAULT_DATA_SUBDIR: &str = ".config/performance-manager";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running on a single machine next
/// to the browser client.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`, uploads can be large).
    pub request_timeout_secs: u64,
    /// Root of the JSON documents and media files.
    pub data_dir: PathBuf,
    /// Upper bound on waiting for a document lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Maximum request body size in bytes.
    pub max_upload_bytes: usize,
    /// Built frontend to serve at `/`, if any.
    pub frontend_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                               |
    /// |------------------------|---------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                             |
    /// | `PORT`                 | `5000`                                |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`               |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                                 |
    /// | `DATA_DIR`             | `$HOME/.config/performance-manager`   |
    /// | `LOCK_TIMEOUT_MS`      | `10000`                               |
    /// | `MAX_UPLOAD_BYTES`     | `524288000`                           |
    /// | `FRONTEND_DIR`         | unset                                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let lock_timeout_ms: u64 = std::env::var("LOCK_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".into())
            .parse()
            .expect("LOCK_TIMEOUT_MS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (500 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let frontend_dir = std::env::var("FRONTEND_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            lock_timeout_ms,
            max_upload_bytes,
            frontend_dir,
        }
    }

    /// Store tuning derived from the lock settings.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::default()
            .with_lock_timeout(Duration::from_millis(self.lock_timeout_ms))
    }
}

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_DATA_SUBDIR),
        None => PathBuf::from(DEFAULT_DATA_SUBDIR),
    }
}
