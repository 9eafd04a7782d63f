use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize)]
pub struct CloudFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CloudTokens {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Provider identifier (e.g., "google_drive")
    fn provider_id(&self) -> &'static str;

    /// Human-readable name (e.g., "Google Drive")
    fn display_name(&self) -> &'static str;

    /// Acquire a fresh access token for this session
    async fn request_token(&self) -> Result<CloudTokens>;

    /// Upload file content to the cloud
    async fn upload_file(
        &self, access_token: &str, file_name: &str, data: Bytes, mime_type: &str,
    ) -> Result<CloudFile>;

    /// List files previously uploaded by this client
    async fn list_files(&self, access_token: &str) -> Result<Vec<CloudFile>>;

    /// Download file content
    async fn download_file(&self, access_token: &str, file_id: &str) -> Result<Bytes>;

    /// Delete a file from the cloud
    async fn delete_file(&self, access_token: &str, file_id: &str) -> Result<()>;
}

pub mod google_drive;
