use super::{CloudFile, CloudProvider, CloudTokens};
use crate::config::ClientConfig;
use crate::error::AppError;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const LIST_FIELDS: &str = "files(id,name,mimeType,createdTime,modifiedTime,size)";

pub struct GoogleDriveProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Drive v3 wire format; `size` is an int64 serialized as a JSON string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: Option<String>,
    size: Option<String>,
    modified_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl From<DriveFile> for CloudFile {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size.and_then(|s| s.parse().ok()),
            modified_at: file.modified_time,
        }
    }
}

impl GoogleDriveProvider {
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
            refresh_token,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let client_id = config.google_client_id.clone().ok_or_else(|| {
            AppError::Config("GOOGLE_CLIENT_ID must be set for cloud backup".to_string())
        })?;
        let client_secret = config.google_client_secret.clone().ok_or_else(|| {
            AppError::Config("GOOGLE_CLIENT_SECRET must be set for cloud backup".to_string())
        })?;
        let refresh_token = config.google_refresh_token.clone().ok_or_else(|| {
            AppError::Config("GOOGLE_REFRESH_TOKEN must be set for cloud backup".to_string())
        })?;
        Ok(Self::new(client_id, client_secret, refresh_token))
    }
}

#[async_trait]
impl CloudProvider for GoogleDriveProvider {
    fn provider_id(&self) -> &'static str {
        "google_drive"
    }

    fn display_name(&self) -> &'static str {
        "Google Drive"
    }

    async fn request_token(&self) -> Result<CloudTokens> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .context("Failed to reach Google token endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Google token endpoint returned {}: {}", status, body.trim());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Unexpected Google token response")?;

        Ok(CloudTokens {
            access_token: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
        })
    }

    async fn upload_file(
        &self, access_token: &str, file_name: &str, data: Bytes, mime_type: &str,
    ) -> Result<CloudFile> {
        let metadata = serde_json::json!({
            "name": file_name,
            "mimeType": mime_type,
        });

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string()).mime_str(mime::APPLICATION_JSON.as_ref())?,
            )
            .part(
                "file",
                Part::bytes(data.to_vec())
                    .file_name(file_name.to_string())
                    .mime_str(mime_type)?,
            );

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .context("Failed to upload file to Google Drive")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Google Drive upload returned {}: {}", status, body.trim());
        }

        let file: DriveFile = response
            .json()
            .await
            .context("Unexpected Google Drive upload response")?;
        Ok(file.into())
    }

    async fn list_files(&self, access_token: &str) -> Result<Vec<CloudFile>> {
        let response = self
            .client
            .get(FILES_URL)
            .query(&[("pageSize", "50"), ("fields", LIST_FIELDS)])
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to list Google Drive files")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Google Drive list returned {}", status);
        }

        let list: DriveFileList = response
            .json()
            .await
            .context("Unexpected Google Drive list response")?;
        Ok(list.files.into_iter().map(CloudFile::from).collect())
    }

    async fn download_file(&self, access_token: &str, file_id: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(format!("{}/{}", FILES_URL, file_id))
            .query(&[("alt", "media")])
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to download file from Google Drive")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Google Drive download returned {}", status);
        }

        response
            .bytes()
            .await
            .context("Failed to read Google Drive download body")
    }

    async fn delete_file(&self, access_token: &str, file_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{}", FILES_URL, file_id))
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to delete file from Google Drive")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Google Drive delete returned {}", status);
        }
        Ok(())
    }
}
