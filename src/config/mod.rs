use crate::error::AppError;
use std::env;
use url::Url;

const DEFAULT_SANITIZE_URL: &str = "http://localhost:8000/sanitize";

/// Client configuration for the sanitize and backup services
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint of the remote metadata-removal service
    pub sanitize_url: Url,

    /// Maximum file size accepted at ingestion in bytes (default: 256 MB)
    pub max_file_size: usize,

    /// Google OAuth client ID (required for backups)
    pub google_client_id: Option<String>,
    /// Google OAuth client secret (required for backups)
    pub google_client_secret: Option<String>,
    /// Google OAuth refresh token granted to this installation
    pub google_refresh_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sanitize_url: Url::parse(DEFAULT_SANITIZE_URL).expect("default sanitize URL is valid"),
            max_file_size: 256 * 1024 * 1024, // 256 MB
            google_client_id: None,
            google_client_secret: None,
            google_refresh_token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let default = Self::default();

        let sanitize_url = match env::var("SANITIZE_URL") {
            Ok(raw) => Url::parse(&raw)
                .map_err(|e| AppError::Config(format!("Invalid SANITIZE_URL '{}': {}", raw, e)))?,
            Err(_) => default.sanitize_url,
        };

        Ok(Self {
            sanitize_url,

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
            google_refresh_token: env::var("GOOGLE_REFRESH_TOKEN").ok(),
        })
    }
}
