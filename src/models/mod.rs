use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

/// Arbitrary, schema-free metadata reported by the sanitize service.
///
/// Field order is preserved so before/after views line up for display.
pub type MetadataMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Uploaded,
    Processing,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    NotRequested,
    Pending,
    Done,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub status: BackupStatus,
    pub remote_id: Option<String>,
}

impl Default for BackupInfo {
    fn default() -> Self {
        Self {
            status: BackupStatus::NotRequested,
            remote_id: None,
        }
    }
}

/// One user-submitted file and its sanitize/backup lifecycle state
#[derive(Debug, Clone, Serialize)]
pub struct FileItem {
    pub id: Uuid,
    #[serde(skip)]
    pub payload: Bytes,
    pub display_name: String,
    pub size_bytes: u64,
    pub state: FileState,
    /// Informational, meaningful only while `state` is `Processing`
    pub progress: u8,
    pub error: Option<String>,
    pub metadata_before: Option<MetadataMap>,
    pub metadata_after: Option<MetadataMap>,
    pub removed_keys: Vec<String>,
    pub remote_link: Option<String>,
    pub backup: BackupInfo,
}

impl FileItem {
    pub fn new(display_name: String, payload: Bytes) -> Self {
        let size_bytes = payload.len() as u64;
        Self {
            id: Uuid::new_v4(),
            payload,
            display_name,
            size_bytes,
            state: FileState::Uploaded,
            progress: 0,
            error: None,
            metadata_before: None,
            metadata_after: None,
            removed_keys: Vec::new(),
            remote_link: None,
            backup: BackupInfo::default(),
        }
    }
}

/// Field names present before sanitization but absent after, in original order
pub fn removed_keys(before: &MetadataMap, after: &MetadataMap) -> Vec<String> {
    before
        .keys()
        .filter(|key| !after.contains_key(key.as_str()))
        .cloned()
        .collect()
}

/// The ordered, mutable collection of all work items for the current session.
///
/// All state transitions go through the methods below; each enforces the
/// monotonic `Uploaded -> Processing -> {Success | Error}` machine and the
/// backup sub-machine, so a stale or repeated call is a no-op rather than a
/// corrupting write.
#[derive(Debug, Default)]
pub struct FileQueue {
    items: Vec<FileItem>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: FileItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[FileItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&FileItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut FileItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Snapshot of items still awaiting sanitization, in queue order
    pub fn uploaded_snapshot(&self) -> Vec<(Uuid, String, Bytes)> {
        self.items
            .iter()
            .filter(|item| item.state == FileState::Uploaded)
            .map(|item| (item.id, item.display_name.clone(), item.payload.clone()))
            .collect()
    }

    /// Sanitized items whose originals have not been backed up yet
    pub fn backup_candidates(&self) -> Vec<(Uuid, String, Bytes)> {
        self.items
            .iter()
            .filter(|item| {
                item.state == FileState::Success && item.backup.status != BackupStatus::Done
            })
            .map(|item| (item.id, item.display_name.clone(), item.payload.clone()))
            .collect()
    }

    /// `Uploaded -> Processing`. Returns false (and leaves the item alone)
    /// for any other starting state.
    pub fn mark_processing(&mut self, id: Uuid) -> bool {
        match self.get_mut(id) {
            Some(item) if item.state == FileState::Uploaded => {
                item.state = FileState::Processing;
                item.progress = 0;
                true
            }
            _ => false,
        }
    }

    /// `Processing -> Success`, attaching the sanitize results
    pub fn complete(
        &mut self,
        id: Uuid,
        metadata_before: MetadataMap,
        metadata_after: MetadataMap,
        remote_link: Option<String>,
    ) -> bool {
        match self.get_mut(id) {
            Some(item) if item.state == FileState::Processing => {
                item.removed_keys = removed_keys(&metadata_before, &metadata_after);
                item.metadata_before = Some(metadata_before);
                item.metadata_after = Some(metadata_after);
                item.remote_link = remote_link;
                item.state = FileState::Success;
                item.progress = 100;
                item.error = None;
                true
            }
            _ => false,
        }
    }

    /// `Processing -> Error`, recording the failure detail
    pub fn fail(&mut self, id: Uuid, message: String) -> bool {
        match self.get_mut(id) {
            Some(item) if item.state == FileState::Processing => {
                item.state = FileState::Error;
                item.progress = 0;
                item.error = Some(message);
                true
            }
            _ => false,
        }
    }

    /// Backup sub-machine: legal only once the parent item is `Success`
    pub fn mark_backup_pending(&mut self, id: Uuid) -> bool {
        match self.get_mut(id) {
            Some(item)
                if item.state == FileState::Success
                    && item.backup.status != BackupStatus::Done =>
            {
                item.backup.status = BackupStatus::Pending;
                true
            }
            _ => false,
        }
    }

    pub fn complete_backup(&mut self, id: Uuid, remote_id: String) -> bool {
        match self.get_mut(id) {
            Some(item) if item.state == FileState::Success => {
                item.backup.status = BackupStatus::Done;
                item.backup.remote_id = Some(remote_id);
                true
            }
            _ => false,
        }
    }

    /// Remove settled items. `Uploaded` and `Processing` items always survive.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| {
            matches!(item.state, FileState::Uploaded | FileState::Processing)
        });
        before - self.items.len()
    }
}
