use super::notifier::{Notification, Notifier};
use crate::models::{FileQueue, MetadataMap};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Result of a successful sanitize call
#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    pub metadata_before: MetadataMap,
    pub metadata_after: MetadataMap,
    pub remote_link: Option<String>,
}

/// Trait for remote metadata-removal implementations
#[async_trait]
pub trait Sanitizer: Send + Sync {
    /// Submit one file's content and receive its before/after metadata
    async fn sanitize(&self, file_name: &str, payload: Bytes) -> Result<SanitizeOutcome>;
}

#[derive(Debug, Deserialize)]
struct SanitizeResponse {
    metadata_before: MetadataMap,
    metadata_after: MetadataMap,
    remote_link: Option<String>,
}

/// Sanitizer backed by the remote HTTP service
pub struct HttpSanitizer {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSanitizer {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Sanitizer for HttpSanitizer {
    async fn sanitize(&self, file_name: &str, payload: Bytes) -> Result<SanitizeOutcome> {
        let form = Form::new().part(
            "file",
            Part::bytes(payload.to_vec()).file_name(file_name.to_string()),
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .context("Failed to reach sanitize service")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Sanitize service returned {}", status);
        }

        let body: SanitizeResponse = response
            .json()
            .await
            .context("Unexpected sanitize response shape")?;

        Ok(SanitizeOutcome {
            metadata_before: body.metadata_before,
            metadata_after: body.metadata_after,
            remote_link: body.remote_link,
        })
    }
}

/// Drives queued items through the remote metadata-removal call.
///
/// One sanitize call is in flight at a time: `batch_lock` serializes whole
/// invocations, and within a batch items are processed sequentially in queue
/// order, so per-file progress stays unambiguous and the remote service sees
/// bounded load.
pub struct SanitizeService {
    queue: Arc<Mutex<FileQueue>>,
    sanitizer: Arc<dyn Sanitizer>,
    notifier: Arc<dyn Notifier>,
    batch_lock: Mutex<()>,
}

impl SanitizeService {
    pub fn new(
        queue: Arc<Mutex<FileQueue>>,
        sanitizer: Arc<dyn Sanitizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queue,
            sanitizer,
            notifier,
            batch_lock: Mutex::new(()),
        }
    }

    /// Process every item that was still `Uploaded` when the batch started.
    ///
    /// Items ingested mid-pass wait for the next invocation. A failing item
    /// is recorded on the item itself and never stops the rest of the batch.
    pub async fn process_all(&self) {
        let _batch = self.batch_lock.lock().await;

        let snapshot = {
            let queue = self.queue.lock().await;
            queue.uploaded_snapshot()
        };

        if snapshot.is_empty() {
            tracing::info!("No files awaiting sanitization");
            return;
        }

        tracing::info!("Processing {} file(s)...", snapshot.len());

        for (id, name, payload) in snapshot {
            if !self.queue.lock().await.mark_processing(id) {
                continue;
            }

            match self.sanitizer.sanitize(&name, payload).await {
                Ok(outcome) => {
                    self.queue.lock().await.complete(
                        id,
                        outcome.metadata_before,
                        outcome.metadata_after,
                        outcome.remote_link,
                    );
                    tracing::info!("{} has been cleaned successfully", name);
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    self.queue.lock().await.fail(id, message.clone());
                    self.notifier.notify(Notification::SanitizeFailed {
                        id,
                        name,
                        error: message,
                    });
                }
            }
        }
    }
}
