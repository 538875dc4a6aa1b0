//! Deletions staged during apply and executed once at commit

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{RestructuringError, Result};
use crate::model::Revision;

/// Relative paths slated for physical removal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDeleteSet {
    paths: BTreeSet<PathBuf>,
}

/// What happened to the staged deletions at commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    /// Files removed from disk
    pub deleted: Vec<PathBuf>,
    /// Staged paths left alone (still in the revision, or already gone)
    pub skipped: Vec<PathBuf>,
}

impl PendingDeleteSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `path`; returns false when it was already staged
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    /// Whether `path` is staged
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Staged paths in order
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    /// Number of staged paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.paths.clear();
    }

    /// Delete every staged path under `root` that `revision` no longer holds,
    /// then prune the folders this leaves empty
    pub(crate) async fn execute(self, root: &Path, revision: &Revision) -> Result<DeletionSummary> {
        let mut summary = DeletionSummary::default();

        for relative in self.paths {
            if revision.contains_document(&relative) {
                warn!(path = %relative.display(), "Staged path was re-created, keeping it");
                summary.skipped.push(relative);
                continue;
            }

            match fs::remove_file(root.join(&relative)).await {
                Ok(()) => {
                    debug!(path = %relative.display(), "Deleted file");
                    prune_empty_dirs(root, &relative).await;
                    summary.deleted.push(relative);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(path = %relative.display(), "Staged path was never on disk");
                    summary.skipped.push(relative);
                }
                Err(e) => {
                    return Err(RestructuringError::CommitFailure(format!(
                        "Failed to delete {}: {}",
                        relative.display(),
                        e
                    )))
                }
            }
        }

        Ok(summary)
    }
}

/// Remove the now-empty ancestors of `relative`, stopping at the first non-empty one
async fn prune_empty_dirs(root: &Path, relative: &Path) {
    for dir in relative.ancestors().skip(1) {
        if dir.as_os_str().is_empty() {
            break;
        }
        if fs::remove_dir(root.join(dir)).await.is_err() {
            break;
        }
        debug!(path = %dir.display(), "Removed empty folder");
    }
}
