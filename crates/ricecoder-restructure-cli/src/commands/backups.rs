// List backup snapshots

use std::path::PathBuf;

use async_trait::async_trait;
use ricecoder_restructuring::{BackupService, BackupSnapshot};

use super::{ensure_solution_dir, Command};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// List the snapshots stored for a codebase
pub struct BackupsCommand {
    pub solution: PathBuf,
    pub json: bool,
}

impl BackupsCommand {
    pub fn new(solution: PathBuf) -> Self {
        Self {
            solution,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Snapshots, oldest first
    pub async fn run(&self) -> CliResult<Vec<BackupSnapshot>> {
        ensure_solution_dir(&self.solution).await?;
        Ok(BackupService::default().list_backups(&self.solution).await?)
    }

    /// Render the listing the way `execute` prints it
    pub fn render(&self, snapshots: &[BackupSnapshot], style: &OutputStyle) -> CliResult<String> {
        if self.json {
            return serde_json::to_string_pretty(snapshots)
                .map_err(|e| CliError::Internal(format!("Failed to serialize backups: {}", e)));
        }
        if snapshots.is_empty() {
            return Ok(style.info(&format!("No backups for {}", self.solution.display())));
        }

        let mut lines = vec![style.header("Backups (oldest first):")];
        for snapshot in snapshots {
            lines.push(format!(
                "  {}  {}  {} file(s)",
                snapshot.id,
                snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                snapshot.file_count()
            ));
        }
        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl Command for BackupsCommand {
    async fn execute(&self) -> CliResult<()> {
        let snapshots = self.run().await?;
        println!("{}", self.render(&snapshots, &OutputStyle::default())?);
        Ok(())
    }
}
