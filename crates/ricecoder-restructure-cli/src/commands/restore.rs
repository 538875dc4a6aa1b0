// Restore a backup snapshot

use std::path::PathBuf;

use async_trait::async_trait;
use ricecoder_restructuring::{BackupService, BackupSnapshot};

use super::{ensure_solution_dir, Command};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// Overwrite the codebase with the files of a snapshot
pub struct RestoreCommand {
    pub solution: PathBuf,
    pub backup: Option<String>,
}

impl RestoreCommand {
    pub fn new(solution: PathBuf) -> Self {
        Self {
            solution,
            backup: None,
        }
    }

    pub fn with_backup(mut self, backup: Option<String>) -> Self {
        self.backup = backup;
        self
    }

    /// Restore the chosen snapshot (latest when none is named); returns it with the file count
    pub async fn run(&self) -> CliResult<(BackupSnapshot, usize)> {
        ensure_solution_dir(&self.solution).await?;

        let service = BackupService::default();
        let snapshot = match &self.backup {
            Some(id) => service.find_backup(&self.solution, id).await?,
            None => service
                .latest_backup(&self.solution)
                .await?
                .ok_or_else(|| CliError::InvalidArgument {
                    message: format!("No backups found for {}", self.solution.display()),
                })?,
        };

        let restored = service.restore_backup(&snapshot).await?;
        Ok((snapshot, restored))
    }

    /// Lines printed after a restore
    ///
    /// Restoring only overwrites the files in the snapshot, so anything a
    /// later run created (relocated namespaces, generated layers) is still there.
    pub fn summary(snapshot: &BackupSnapshot, restored: usize, style: &OutputStyle) -> String {
        [
            style.success(&format!(
                "Restored {} file(s) from backup {}",
                restored, snapshot.id
            )),
            style.warning(&format!(
                "Files created after {} were kept; remove relocated or generated folders by hand",
                snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            )),
        ]
        .join("\n")
    }
}

#[async_trait]
impl Command for RestoreCommand {
    async fn execute(&self) -> CliResult<()> {
        let (snapshot, restored) = self.run().await?;
        println!("{}", Self::summary(&snapshot, restored, &OutputStyle::default()));
        Ok(())
    }
}
