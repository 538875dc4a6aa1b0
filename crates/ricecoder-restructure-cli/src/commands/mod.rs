// Command handlers for rice-restructure

pub mod backups;
pub mod generate;
pub mod restore;
pub mod restructure;

pub use backups::BackupsCommand;
pub use generate::GenerateCommand;
pub use restore::RestoreCommand;
pub use restructure::RestructureCommand;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ricecoder_restructuring::{
    CommitReport, EngineSettings, LanguageProfile, RestructuringEngine, RestructuringPreview,
    TextCodeModelProvider, Transformation, TransformationOutcome,
};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}

/// What one engine run staged and wrote
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Per-transformation outcomes, in apply order
    pub outcomes: Vec<TransformationOutcome>,
    /// Changes as staged before commit
    pub preview: RestructuringPreview,
    /// Commit result; `None` for dry runs
    pub commit: Option<CommitReport>,
    /// Snapshot taken before the run
    pub backup_id: Option<String>,
}

/// Shared initialize, apply, preview and commit flow of the transforming commands
pub struct Pipeline {
    solution: PathBuf,
    profile: LanguageProfile,
    settings: EngineSettings,
}

impl Pipeline {
    pub fn new(solution: PathBuf, profile: LanguageProfile, settings: EngineSettings) -> Self {
        Self {
            solution,
            profile,
            settings,
        }
    }

    /// Run `transformations` in order; commits unless the settings ask for a dry run
    pub async fn run(&self, transformations: &[Transformation]) -> CliResult<PipelineReport> {
        ensure_solution_dir(&self.solution).await?;

        let provider = TextCodeModelProvider::new(self.profile.clone())?;
        let mut engine = RestructuringEngine::new(Arc::new(provider), self.settings.clone());
        engine.initialize(&self.solution).await?;

        for transformation in transformations {
            debug!(transformation = %transformation.describe(), "Applying");
            engine.apply_transformation(transformation)?;
        }

        let preview = engine.preview()?;
        let commit = if self.settings.dry_run {
            info!(changes = preview.changes.len(), "Dry run, nothing written");
            None
        } else {
            Some(engine.commit_changes().await?)
        };

        Ok(PipelineReport {
            outcomes: engine.report().to_vec(),
            preview,
            commit,
            backup_id: engine.snapshot().map(|snapshot| snapshot.id.clone()),
        })
    }
}

/// Fail early with a readable message when the codebase root is missing
pub(crate) async fn ensure_solution_dir(solution: &Path) -> CliResult<()> {
    match tokio::fs::metadata(solution).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CliError::InvalidArgument {
            message: format!("{} is not a directory", solution.display()),
        }),
        Err(_) => Err(CliError::InvalidArgument {
            message: format!("{} does not exist", solution.display()),
        }),
    }
}

/// Print the outcome of a pipeline run to stdout
pub(crate) fn print_report(report: &PipelineReport, show_diff: bool) {
    let style = OutputStyle::default();

    for outcome in &report.outcomes {
        println!("{}", style.outcome(outcome));
    }
    println!();

    match &report.commit {
        None => {
            println!("{}", style.preview(&report.preview, show_diff));
            println!();
            println!("{}", style.info("Dry run: no files were written"));
        }
        Some(commit) => {
            if show_diff {
                println!("{}", style.preview(&report.preview, true));
                println!();
            }
            println!(
                "{}",
                style.success(&format!(
                    "Wrote {} file(s), deleted {} file(s)",
                    commit.written.len(),
                    commit.deleted.len()
                ))
            );
            for path in &commit.skipped {
                println!(
                    "{}",
                    style.warning(&format!("Kept {} (still part of the codebase)", path.display()))
                );
            }
            if let Some(id) = &report.backup_id {
                println!("{}", style.info(&format!("Backup: {}", id)));
            }
        }
    }
}
