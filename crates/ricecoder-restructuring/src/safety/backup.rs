//! Whole-tree snapshots taken before a restructuring run

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{RestructuringError, Result};

/// Backup store location, relative to the codebase root
pub const BACKUP_FOLDER: &str = ".restructure/backups";

const MANIFEST_FILE: &str = "manifest.json";
const FILES_FOLDER: &str = "files";

/// A read-only copy of a codebase tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    /// Timestamp-derived identifier, also the snapshot folder name
    pub id: String,
    /// Codebase root the snapshot was taken from
    pub root: PathBuf,
    /// Snapshot folder
    pub location: PathBuf,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Relative path -> SHA-256 of the copied bytes
    pub files: BTreeMap<PathBuf, String>,
}

impl BackupSnapshot {
    /// Folder holding the copied files
    pub fn files_dir(&self) -> PathBuf {
        self.location.join(FILES_FOLDER)
    }

    /// Number of files in the snapshot
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Creates, lists and restores snapshots under [`BACKUP_FOLDER`]
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use ricecoder_restructuring::BackupService;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("Program.cs"), "namespace App;\n").unwrap();
///
/// let service = BackupService::new(3);
/// let snapshot = service.create_backup(dir.path()).await.unwrap();
/// assert_eq!(snapshot.file_count(), 1);
/// assert_eq!(service.list_backups(dir.path()).await.unwrap().len(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct BackupService {
    retention_count: usize,
}

impl Default for BackupService {
    fn default() -> Self {
        Self::new(10)
    }
}

impl BackupService {
    /// Create a service that keeps the newest `retention_count` snapshots (at least one)
    pub fn new(retention_count: usize) -> Self {
        Self {
            retention_count: retention_count.max(1),
        }
    }

    /// Backup store for `root`
    pub fn store_dir(root: &Path) -> PathBuf {
        root.join(BACKUP_FOLDER)
    }

    /// Copy every file under `root` (except the backup store) into a new snapshot
    pub async fn create_backup(&self, root: &Path) -> Result<BackupSnapshot> {
        let metadata = fs::metadata(root).await.map_err(|e| {
            RestructuringError::BackupFailed(format!("Cannot read {}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(RestructuringError::BackupFailed(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let store = Self::store_dir(root);
        let created_at = Utc::now();
        let base_id = created_at.format("%Y%m%d_%H%M%S_%f").to_string();
        let mut id = base_id.clone();
        let mut attempt = 1;
        while fs::try_exists(store.join(&id)).await.unwrap_or(false) {
            id = format!("{}_{}", base_id, attempt);
            attempt += 1;
        }

        let location = store.join(&id);
        let files_dir = location.join(FILES_FOLDER);
        let mut files = BTreeMap::new();

        for relative in collect_files(root, &store).await? {
            let bytes = fs::read(root.join(&relative)).await.map_err(|e| {
                RestructuringError::BackupFailed(format!(
                    "Failed to read {}: {}",
                    relative.display(),
                    e
                ))
            })?;

            let destination = files_dir.join(&relative);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    RestructuringError::BackupFailed(format!(
                        "Failed to create backup directory: {}",
                        e
                    ))
                })?;
            }
            fs::write(&destination, &bytes).await.map_err(|e| {
                RestructuringError::BackupFailed(format!(
                    "Failed to write backup of {}: {}",
                    relative.display(),
                    e
                ))
            })?;

            files.insert(relative, compute_hash(&bytes));
        }

        fs::create_dir_all(&location).await.map_err(|e| {
            RestructuringError::BackupFailed(format!("Failed to create backup directory: {}", e))
        })?;

        let snapshot = BackupSnapshot {
            id,
            root: root.to_path_buf(),
            location,
            created_at,
            files,
        };
        let manifest = serde_json::to_string_pretty(&snapshot)?;
        fs::write(snapshot.location.join(MANIFEST_FILE), manifest)
            .await
            .map_err(|e| {
                RestructuringError::BackupFailed(format!("Failed to write manifest: {}", e))
            })?;

        info!(
            id = %snapshot.id,
            files = snapshot.file_count(),
            root = %root.display(),
            "Created backup snapshot"
        );

        self.enforce_retention_policy(root).await?;
        Ok(snapshot)
    }

    /// Check every snapshot file against the hash recorded in its manifest
    pub async fn verify_snapshot(&self, snapshot: &BackupSnapshot) -> Result<()> {
        let files_dir = snapshot.files_dir();
        for (relative, expected) in &snapshot.files {
            let path = files_dir.join(relative);
            let bytes = fs::read(&path)
                .await
                .map_err(|_| RestructuringError::BackupCorrupted(path.clone()))?;
            if compute_hash(&bytes) != *expected {
                return Err(RestructuringError::BackupCorrupted(path));
            }
        }
        Ok(())
    }

    /// Overwrite the snapshot's files under its original root
    ///
    /// Files created after the snapshot was taken are left in place. Returns
    /// the number of restored files.
    pub async fn restore_backup(&self, snapshot: &BackupSnapshot) -> Result<usize> {
        self.verify_snapshot(snapshot).await?;

        let files_dir = snapshot.files_dir();
        for relative in snapshot.files.keys() {
            let target = snapshot.root.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    RestructuringError::RestoreFailed(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            fs::copy(files_dir.join(relative), &target)
                .await
                .map_err(|e| {
                    RestructuringError::RestoreFailed(format!(
                        "Failed to restore {}: {}",
                        relative.display(),
                        e
                    ))
                })?;
        }

        info!(
            id = %snapshot.id,
            files = snapshot.file_count(),
            root = %snapshot.root.display(),
            "Restored backup snapshot"
        );
        Ok(snapshot.file_count())
    }

    /// Snapshots stored under `root`, oldest first
    pub async fn list_backups(&self, root: &Path) -> Result<Vec<BackupSnapshot>> {
        let store = Self::store_dir(root);
        if !fs::try_exists(&store).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        let mut entries = fs::read_dir(&store).await?;
        while let Some(entry) = entries.next_entry().await? {
            let manifest = entry.path().join(MANIFEST_FILE);
            let content = match fs::read_to_string(&manifest).await {
                Ok(content) => content,
                Err(_) => {
                    debug!(path = %entry.path().display(), "Skipping folder without manifest");
                    continue;
                }
            };
            match serde_json::from_str::<BackupSnapshot>(&content) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!(path = %manifest.display(), error = %e, "Unreadable backup manifest"),
            }
        }

        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(snapshots)
    }

    /// Most recent snapshot, if any
    pub async fn latest_backup(&self, root: &Path) -> Result<Option<BackupSnapshot>> {
        Ok(self.list_backups(root).await?.pop())
    }

    /// Snapshot with the given id
    pub async fn find_backup(&self, root: &Path, id: &str) -> Result<BackupSnapshot> {
        self.list_backups(root)
            .await?
            .into_iter()
            .find(|snapshot| snapshot.id == id)
            .ok_or_else(|| {
                RestructuringError::RestoreFailed(format!("No backup with id '{}'", id))
            })
    }

    /// Delete the oldest snapshots beyond the retention count; returns how many were removed
    pub async fn enforce_retention_policy(&self, root: &Path) -> Result<usize> {
        let snapshots = self.list_backups(root).await?;
        let excess = snapshots.len().saturating_sub(self.retention_count);

        for snapshot in snapshots.iter().take(excess) {
            fs::remove_dir_all(&snapshot.location).await.map_err(|e| {
                RestructuringError::BackupFailed(format!(
                    "Failed to delete old backup {}: {}",
                    snapshot.id, e
                ))
            })?;
            debug!(id = %snapshot.id, "Deleted old backup snapshot");
        }

        Ok(excess)
    }
}

/// SHA-256 of `bytes` as lowercase hex
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Relative paths of every regular file under `root`, skipping `exclude`
async fn collect_files(root: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            RestructuringError::BackupFailed(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                if path != exclude {
                    pending.push(path);
                }
            } else if file_type.is_file() {
                let relative = path
                    .strip_prefix(root)
                    .map_err(|e| RestructuringError::BackupFailed(e.to_string()))?;
                files.push(relative.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}
