//! Restructuring orchestration
//!
//! [`RestructuringEngine`] drives a run through its lifecycle:
//!
//! ```text
//! Uninitialized --initialize--> Ready --apply--> Applying --apply--> ... --commit--> Committed
//!                                 \________________\_____ any error ____> Failed
//! ```
//!
//! Applying a transformation only edits the in-memory [`Revision`]. Files are
//! written and deleted once, in [`RestructuringEngine::commit_changes`], so a
//! failure before commit leaves the tree on disk untouched.

mod extract;
mod layer;
mod pending;
mod rename;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use layer::{layer_references, REFERENCES_OPTION, STUB_SUFFIX};
pub use pending::{DeletionSummary, PendingDeleteSet};
pub use rename::TEMP_MARKER;

use crate::{
    analysis::{DependencyAnalyzer, Validation},
    config::EngineSettings,
    error::{RestructuringError, Result},
    identifier::Identifier,
    model::Revision,
    preview::{PreviewGenerator, RestructuringPreview},
    providers::CodeModelProvider,
    safety::{BackupService, BackupSnapshot},
    types::{Transformation, TransformationOutcome},
};

/// Lifecycle state of a [`RestructuringEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    /// Nothing opened yet
    Uninitialized,
    /// Backup taken and revision opened
    Ready,
    /// At least one transformation staged
    Applying,
    /// Changes written to disk
    Committed,
    /// A step failed; the run cannot continue
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Ready => "ready",
            EngineState::Applying => "applying",
            EngineState::Committed => "committed",
            EngineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a commit wrote and deleted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Documents written
    pub written: Vec<PathBuf>,
    /// Files deleted
    pub deleted: Vec<PathBuf>,
    /// Staged deletions that were not carried out
    pub skipped: Vec<PathBuf>,
}

/// Orchestrates validation, staging and commit of transformations
pub struct RestructuringEngine {
    provider: Arc<dyn CodeModelProvider>,
    analyzer: DependencyAnalyzer,
    backups: BackupService,
    settings: EngineSettings,
    state: EngineState,
    root: Option<PathBuf>,
    revision: Option<Revision>,
    baseline: BTreeMap<PathBuf, String>,
    pending: PendingDeleteSet,
    snapshot: Option<BackupSnapshot>,
    outcomes: Vec<TransformationOutcome>,
}

impl RestructuringEngine {
    /// Create an engine backed by `provider`
    pub fn new(provider: Arc<dyn CodeModelProvider>, settings: EngineSettings) -> Self {
        let analyzer = DependencyAnalyzer::new(provider.clone())
            .with_cycle_detection(settings.cycle_detection);
        let backups = BackupService::new(settings.backup_retention);

        Self {
            provider,
            analyzer,
            backups,
            settings,
            state: EngineState::Uninitialized,
            root: None,
            revision: None,
            baseline: BTreeMap::new(),
            pending: PendingDeleteSet::new(),
            snapshot: None,
            outcomes: Vec::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Settings in use
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Codebase root, once initialized
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Current revision (none before initialize or after a failure)
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Paths staged for deletion
    pub fn pending_deletes(&self) -> &PendingDeleteSet {
        &self.pending
    }

    /// Snapshot taken at initialize
    pub fn snapshot(&self) -> Option<&BackupSnapshot> {
        self.snapshot.as_ref()
    }

    /// Outcomes of the transformations applied so far, in order
    pub fn report(&self) -> &[TransformationOutcome] {
        &self.outcomes
    }

    /// Take the backup snapshot of `root`, then open the initial revision
    ///
    /// In dry-run mode no snapshot is taken.
    pub async fn initialize(&mut self, root: &Path) -> Result<()> {
        if self.state != EngineState::Uninitialized {
            return Err(self.invalid_state("initialize"));
        }

        match self.open(root).await {
            Ok(()) => {
                self.state = EngineState::Ready;
                info!(
                    root = %root.display(),
                    documents = self.revision.as_ref().map(Revision::document_count).unwrap_or(0),
                    dry_run = self.settings.dry_run,
                    "Restructuring engine ready"
                );
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(RestructuringError::InitializationError(e.to_string()))
            }
        }
    }

    async fn open(&mut self, root: &Path) -> Result<()> {
        if !self.settings.dry_run {
            self.snapshot = Some(self.backups.create_backup(root).await?);
        }

        let revision = self.provider.open(root).await?;
        self.baseline = revision
            .documents()
            .map(|doc| (doc.path.clone(), doc.content.clone()))
            .collect();
        self.revision = Some(revision);
        self.root = Some(root.to_path_buf());
        Ok(())
    }

    /// Validate `transformation` against the current dependency graph and stage it
    pub fn apply_transformation(
        &mut self,
        transformation: &Transformation,
    ) -> Result<TransformationOutcome> {
        if !matches!(self.state, EngineState::Ready | EngineState::Applying) {
            return Err(self.invalid_state("apply a transformation"));
        }
        let Some(revision) = self.revision.take() else {
            return Err(self.invalid_state("apply a transformation"));
        };

        self.state = EngineState::Applying;
        debug!(transformation = %transformation, "Applying transformation");

        match self.stage(revision, transformation) {
            Ok((revision, outcome)) => {
                info!(
                    transformation = %transformation,
                    added = outcome.added.len(),
                    modified = outcome.modified.len(),
                    relocated = outcome.relocated.len(),
                    "Staged transformation"
                );
                self.revision = Some(revision);
                self.outcomes.push(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                warn!(transformation = %transformation, error = %e, "Transformation failed");
                self.fail();
                Err(e)
            }
        }
    }

    fn stage(
        &mut self,
        revision: Revision,
        transformation: &Transformation,
    ) -> Result<(Revision, TransformationOutcome)> {
        let (source, target) = self.validation_pair(&revision, transformation)?;
        let graph = self.analyzer.build_dependency_graph(&revision)?;

        if let Validation::Conflicts(conflicts) = self.analyzer.validate(&source, &target, &graph) {
            for conflict in &conflicts {
                warn!(transformation = %transformation, conflict = %conflict, "Dependency conflict");
            }
            return Err(RestructuringError::ValidationConflict {
                transformation: transformation.describe(),
                conflicts,
            });
        }

        let provider = self.provider.as_ref();
        let mut outcome = TransformationOutcome::new(transformation);
        let revision = match transformation {
            Transformation::MoveNamespace { source, target }
            | Transformation::RenameNamespace { source, target } => rename::move_namespace(
                provider,
                revision,
                source,
                target,
                &mut self.pending,
                &mut outcome,
            )?,
            Transformation::ExtractClass {
                class_name,
                target_namespace,
            } => extract::extract_class(
                provider,
                revision,
                class_name,
                target_namespace,
                &mut outcome,
            )?,
            Transformation::GenerateLayer {
                name,
                subfolders,
                options,
            } => layer::generate_layer(provider, revision, name, subfolders, options, &mut outcome)?,
        };

        Ok((revision, outcome))
    }

    /// Source and target a transformation is validated as
    fn validation_pair(
        &self,
        revision: &Revision,
        transformation: &Transformation,
    ) -> Result<(Identifier, Identifier)> {
        match transformation {
            Transformation::MoveNamespace { source, target }
            | Transformation::RenameNamespace { source, target } => {
                Ok((source.clone(), target.clone()))
            }
            Transformation::ExtractClass {
                class_name,
                target_namespace,
            } => {
                let declaration =
                    extract::locate_declaration(self.provider.as_ref(), revision, class_name)?;
                let source = declaration
                    .namespace
                    .unwrap_or_else(|| target_namespace.clone());
                Ok((source, target_namespace.clone()))
            }
            Transformation::GenerateLayer { name, .. } => Ok((name.clone(), name.clone())),
        }
    }

    /// Preview of everything a commit would write and delete; touches no files
    pub fn preview(&self) -> Result<RestructuringPreview> {
        match (&self.state, &self.revision) {
            (EngineState::Ready | EngineState::Applying, Some(revision)) => Ok(
                PreviewGenerator::generate(&self.baseline, revision, &self.pending),
            ),
            _ => Err(RestructuringError::InvalidState {
                operation: "preview changes".to_string(),
                state: self.state.to_string(),
            }),
        }
    }

    /// Write the revision through the provider, then delete the staged paths
    pub async fn commit_changes(&mut self) -> Result<CommitReport> {
        if !matches!(self.state, EngineState::Ready | EngineState::Applying) {
            return Err(self.invalid_state("commit changes"));
        }
        if self.settings.dry_run {
            self.fail();
            return Err(RestructuringError::InvalidState {
                operation: "commit changes".to_string(),
                state: "dry-run".to_string(),
            });
        }
        let (Some(root), Some(revision)) = (self.root.clone(), self.revision.take()) else {
            return Err(self.invalid_state("commit changes"));
        };

        if let Err(e) = self.provider.apply(&root, &revision).await {
            self.fail();
            return Err(RestructuringError::CommitFailure(format!(
                "Failed to write revision: {}",
                e
            )));
        }

        let pending = std::mem::take(&mut self.pending);
        let summary = match pending.execute(&root, &revision).await {
            Ok(summary) => summary,
            Err(e) => {
                self.fail();
                return Err(match e {
                    RestructuringError::CommitFailure(_) => e,
                    other => RestructuringError::CommitFailure(other.to_string()),
                });
            }
        };

        let report = CommitReport {
            written: revision
                .touched_documents()
                .map(|doc| doc.path.clone())
                .collect(),
            deleted: summary.deleted,
            skipped: summary.skipped,
        };
        self.revision = Some(revision);
        self.state = EngineState::Committed;

        info!(
            written = report.written.len(),
            deleted = report.deleted.len(),
            skipped = report.skipped.len(),
            "Committed restructuring"
        );
        Ok(report)
    }

    /// Apply every transformation in order, then commit
    pub async fn run(&mut self, transformations: &[Transformation]) -> Result<CommitReport> {
        for transformation in transformations {
            self.apply_transformation(transformation)?;
        }
        self.commit_changes().await
    }

    /// Restore the snapshot taken at initialize; never called automatically
    pub async fn restore_backup(&self) -> Result<usize> {
        let snapshot = self.snapshot.as_ref().ok_or_else(|| {
            RestructuringError::RestoreFailed("No backup snapshot was taken".to_string())
        })?;
        self.backups.restore_backup(snapshot).await
    }

    fn invalid_state(&mut self, operation: &str) -> RestructuringError {
        let error = RestructuringError::InvalidState {
            operation: operation.to_string(),
            state: self.state.to_string(),
        };
        if matches!(self.state, EngineState::Ready | EngineState::Applying) {
            self.fail();
        }
        error
    }

    fn fail(&mut self) {
        if self.state != EngineState::Failed {
            warn!(from = %self.state, "Restructuring engine failed");
        }
        self.state = EngineState::Failed;
        self.revision = None;
        self.pending.clear();
    }
}
