use super::cloud_providers::CloudProvider;
use super::notifier::{Notification, Notifier};
use super::token_manager::TokenManager;
use crate::error::AppError;
use crate::models::FileQueue;
use crate::utils::mime_type::detect_mime;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Drives sanitized items through the cloud upload, independent of sanitize
/// timing. Only reads `Success` items and only writes the backup sub-record,
/// so it can run alongside a sanitize pass without racing on the same fields.
pub struct BackupService {
    queue: Arc<Mutex<FileQueue>>,
    provider: Arc<dyn CloudProvider>,
    tokens: Arc<TokenManager>,
    notifier: Arc<dyn Notifier>,
}

impl BackupService {
    pub fn new(
        queue: Arc<Mutex<FileQueue>>,
        provider: Arc<dyn CloudProvider>,
        tokens: Arc<TokenManager>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queue,
            provider,
            tokens,
            notifier,
        }
    }

    /// Back up every sanitized item whose original is not yet stored.
    ///
    /// The whole batch waits on one confirmed credential: if acquisition
    /// fails, no upload is attempted and no sub-record changes. A failing
    /// upload leaves its item `Pending` and the batch moves on.
    pub async fn backup_all(&self) -> Result<(), AppError> {
        let candidates = {
            let queue = self.queue.lock().await;
            queue.backup_candidates()
        };

        if candidates.is_empty() {
            tracing::info!("No files to back up");
            return Ok(());
        }

        let access_token = match self.tokens.get_valid_token().await {
            Ok(token) => token,
            Err(e) => {
                let error = format!("{:#}", e);
                self.notifier
                    .notify(Notification::CredentialFailed { error: error.clone() });
                return Err(AppError::Auth(error));
            }
        };

        self.notifier.notify(Notification::BackupStarted {
            count: candidates.len(),
        });
        tracing::info!(
            "Backing up {} file(s) to {}...",
            candidates.len(),
            self.provider.display_name()
        );

        for (id, name, payload) in candidates {
            self.queue.lock().await.mark_backup_pending(id);

            let destination = format!("{}_cleaned", name);
            let mime_type = detect_mime(&payload, &name);

            match self
                .provider
                .upload_file(&access_token, &destination, payload, mime_type)
                .await
            {
                Ok(remote) => {
                    self.queue.lock().await.complete_backup(id, remote.id);
                    tracing::info!("{} backed up as {}", name, remote.name);
                }
                Err(e) => {
                    let error = format!("{:#}", e);
                    self.notifier.notify(Notification::BackupFailed {
                        id,
                        name,
                        error,
                    });
                }
            }
        }

        Ok(())
    }
}
