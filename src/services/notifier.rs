use uuid::Uuid;

/// User-facing event emitted by the orchestrator.
///
/// The rendering layer decides wording; the kind and the data carried here
/// are the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    FilesIngested { count: usize },
    SanitizeFailed { id: Uuid, name: String, error: String },
    BackupStarted { count: usize },
    BackupFailed { id: Uuid, name: String, error: String },
    CredentialFailed { error: String },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: Notification);
}

/// Notifier that forwards events to the tracing subscriber
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Notification) {
        match event {
            Notification::FilesIngested { count } => {
                tracing::info!("{} file(s) ready to process", count);
            }
            Notification::SanitizeFailed { name, error, .. } => {
                tracing::warn!("Processing failed for {}: {}", name, error);
            }
            Notification::BackupStarted { count } => {
                tracing::info!("Backing up {} file(s)...", count);
            }
            Notification::BackupFailed { name, error, .. } => {
                tracing::warn!("Backup failed for {}: {}", name, error);
            }
            Notification::CredentialFailed { error } => {
                tracing::error!("Cloud storage connection failed: {}", error);
            }
        }
    }
}
