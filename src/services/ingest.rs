use super::notifier::{Notification, Notifier};
use crate::models::{FileItem, FileQueue};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A raw file handed over by the user-interaction surface
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub bytes: Bytes,
}

/// Turns newly selected raw files into queued work items
pub struct IngestService {
    queue: Arc<Mutex<FileQueue>>,
    notifier: Arc<dyn Notifier>,
    max_file_size: usize,
}

impl IngestService {
    pub fn new(
        queue: Arc<Mutex<FileQueue>>,
        notifier: Arc<dyn Notifier>,
        max_file_size: usize,
    ) -> Self {
        Self {
            queue,
            notifier,
            max_file_size,
        }
    }

    /// Append one `Uploaded` item per input file. Identical content produces
    /// distinct items; malformed entries are skipped without failing the
    /// call. Returns the number of items created.
    pub async fn ingest(&self, incoming: Vec<IncomingFile>) -> usize {
        let mut accepted = 0;
        {
            let mut queue = self.queue.lock().await;
            for file in incoming {
                if file.name.is_empty() {
                    tracing::debug!("Skipping ingest entry without a name");
                    continue;
                }
                if file.bytes.len() > self.max_file_size {
                    tracing::debug!(
                        "Skipping {}: {} bytes exceeds the {} byte limit",
                        file.name,
                        file.bytes.len(),
                        self.max_file_size
                    );
                    continue;
                }
                queue.push(FileItem::new(file.name, file.bytes));
                accepted += 1;
            }
        }

        self.notifier
            .notify(Notification::FilesIngested { count: accepted });
        accepted
    }

    /// Read files from disk and ingest them; unreadable paths are skipped
    pub async fn ingest_paths(&self, paths: &[PathBuf]) -> usize {
        let mut incoming = Vec::with_capacity(paths.len());
        for path in paths {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let name = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or_default()
                        .to_string();
                    incoming.push(IncomingFile {
                        name,
                        bytes: Bytes::from(bytes),
                    });
                }
                Err(e) => {
                    tracing::debug!("Skipping unreadable file {}: {}", path.display(), e);
                }
            }
        }
        self.ingest(incoming).await
    }
}
